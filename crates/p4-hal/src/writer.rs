//! Sinks for streamed responses.

use std::sync::mpsc;
use thiserror::Error;

/// The receiving side of a writer has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("response writer closed")]
pub struct WriterClosed;

/// Destination for messages produced one at a time, such as read responses
/// or switch events.
pub trait Writer<T>: Send {
    fn write(&mut self, msg: T) -> Result<(), WriterClosed>;
}

impl<T: Send> Writer<T> for Vec<T> {
    fn write(&mut self, msg: T) -> Result<(), WriterClosed> {
        self.push(msg);
        Ok(())
    }
}

impl<T: Send> Writer<T> for mpsc::Sender<T> {
    fn write(&mut self, msg: T) -> Result<(), WriterClosed> {
        self.send(msg).map_err(|_| WriterClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_writer_collects() {
        let mut out: Vec<u32> = Vec::new();
        out.write(1).unwrap();
        out.write(2).unwrap();
        assert_eq!(out, vec![1, 2]);
    }

    #[test]
    fn test_channel_writer_reports_closed() {
        let (mut tx, rx) = mpsc::channel::<u32>();
        tx.write(7).unwrap();
        assert_eq!(rx.recv().unwrap(), 7);

        drop(rx);
        assert_eq!(tx.write(8), Err(WriterClosed));
    }
}
