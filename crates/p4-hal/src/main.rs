//! p4-hal entry point.
//!
//! Builds a switch over the in-memory pipeline runtime, applies the chassis
//! config and, when given, the forwarding pipeline, then serves until
//! interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use p4_hal::audit::{AuditCategory, AuditOutcome, AuditRecord};
use p4_hal::chassis::ChassisConfig;
use p4_hal::{audit_log, config, sim, Node, P4Switch, SwitchInterface};
use pipeline_runtime::SimRuntime;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// P4Runtime hardware abstraction layer
#[derive(Parser, Debug)]
#[command(name = "p4-hal")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Device id of the node served when no chassis config is given
    #[arg(short = 'd', long, default_value = "1")]
    device_id: u64,

    /// Chassis config (YAML)
    #[arg(short = 'c', long)]
    chassis_config: Option<PathBuf>,

    /// Binary-encoded P4Info of the pipeline to push at startup
    #[arg(long, requires = "pipeline_object")]
    p4info: Option<PathBuf>,

    /// Compiled pipeline object to push at startup
    #[arg(long, requires = "p4info")]
    pipeline_object: Option<PathBuf>,

    /// Where the runtime stages pipeline objects before loading them
    #[arg(long, default_value = "/etc/p4-hal/pipeline.o")]
    staging_path: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("--- Starting p4-hal ---");

    let chassis = match &args.chassis_config {
        Some(path) => config::load_chassis_config(path)
            .with_context(|| format!("loading chassis config {}", path.display()))?,
        None => ChassisConfig::single_node(args.device_id),
    };

    let runtime = Arc::new(SimRuntime::new(&args.staging_path));
    let nodes = chassis
        .nodes
        .iter()
        .map(|n| Node::new(n.id, runtime.clone()));
    let switch = P4Switch::new(nodes);
    info!(nodes = ?switch.node_ids(), staging = %args.staging_path.display(), "Switch created");

    switch
        .push_chassis_config(&chassis)
        .context("pushing chassis config")?;

    if let (Some(p4info), Some(object)) = (&args.p4info, &args.pipeline_object) {
        let pipeline = config::load_pipeline_config(p4info, object)
            .context("loading forwarding pipeline config")?;
        for node_id in switch.node_ids() {
            let node = switch.node(node_id)?;
            let schema = node.verify_forwarding_pipeline_config(&pipeline)?;
            sim::provision(&runtime, node_id, &schema);
            switch
                .push_forwarding_pipeline_config(node_id, &pipeline)
                .with_context(|| format!("pushing pipeline to node {}", node_id))?;
        }
    } else {
        warn!("No pipeline given, nodes stay uninitialized");
    }

    audit_log!(AuditRecord::new(AuditCategory::SystemLifecycle, "p4-hal", "start")
        .with_outcome(AuditOutcome::Success)
        .with_details(serde_json::json!({
            "nodes": switch.node_ids(),
            "ports": switch.port_count(),
        })));
    info!("p4-hal ready, press Ctrl-C to exit");

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;

    info!("Shutting down");
    switch.shutdown()?;
    audit_log!(AuditRecord::new(AuditCategory::SystemLifecycle, "p4-hal", "shutdown")
        .with_outcome(AuditOutcome::Success));
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .init();
}
