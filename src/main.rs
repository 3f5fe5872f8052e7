//! statusline - desktop status aggregation daemon.
//!
//! Each cycle polls power, network, cloud-sync, and audio state in
//! parallel, renders one compact line, and publishes it to the X root
//! window name for the window manager to display. Individual sources may
//! be absent, misbehaving, or slow; the loop never dies for any of them.

mod capability;
mod config;
mod icons;
mod probe;
mod publish;
mod render;
mod scheduler;
mod services;
mod status;

use anyhow::Context;
use config::Config;
use probe::{CommandRunner, SystemRunner};
use publish::{StatusSink, XsetrootSink};
use scheduler::Scheduler;
use services::cloudsync::{SessionBus, SyncBus};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("invalid configuration")?;
    log::info!("statusline starting: {config:?}");

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let bus: Arc<dyn SyncBus> = Arc::new(SessionBus);
    let sink: Arc<dyn StatusSink> = Arc::new(XsetrootSink::new(Arc::clone(&runner)));

    Scheduler::new(config, runner, bus, sink).run().await;
    Ok(())
}
