//! Byte-order conversion between P4Runtime and the pipeline runtime.
//!
//! P4Runtime carries values big-endian; the runtime stores them in reverse
//! byte order, sized to the field's bit-width rounded up to whole bytes.

use crate::error::{HalError, HalResult};

/// Converts a P4Runtime value to runtime order, padded to `width` bytes.
///
/// Shorter values are zero-extended. Longer values are accepted only when
/// the excess leading bytes are zero.
pub fn to_runtime(value: &[u8], width: usize, what: &str) -> HalResult<Vec<u8>> {
    let value = if value.len() > width {
        let (excess, rest) = value.split_at(value.len() - width);
        if excess.iter().any(|b| *b != 0) {
            return Err(HalError::invalid_param(format!(
                "{} is {} bytes, wider than {} bytes",
                what,
                value.len(),
                width
            )));
        }
        rest
    } else {
        value
    };

    let mut out = Vec::with_capacity(width);
    out.extend(value.iter().rev().copied());
    out.resize(width, 0);
    Ok(out)
}

/// Converts runtime bytes back to a big-endian value of exactly `width`
/// bytes, dropping anything the runtime holds past the field's width.
pub fn from_runtime(data: &[u8], width: usize) -> Vec<u8> {
    let mut le: Vec<u8> = data.iter().take(width).copied().collect();
    le.resize(width, 0);
    le.reverse();
    le
}
