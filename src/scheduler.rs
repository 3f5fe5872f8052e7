//! The polling loop.
//!
//! One cycle: recompute icon capability, fan the four pollers out as
//! tasks, fan in against an absolute deadline, render, publish, sleep
//! the remainder of the interval. Cycles are independent; a poller that
//! misses the deadline is unavailable for that cycle only and its task
//! is abandoned to finish on its own (pollers only read).

use crate::capability;
use crate::config::Config;
use crate::probe::{CommandRunner, PROBE_TIMEOUT, ProbeError, warn_once};
use crate::publish::StatusSink;
use crate::render::render;
use crate::services::cloudsync::SyncBus;
use crate::services::{battery, cloudsync, network, volume};
use crate::status::{Readings, SourceResult};
use chrono::Local;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout_at};

/// Startup gate: how many one-second polls to wait for NetworkManager to
/// report a connected state before the first cycle.
const STARTUP_POLLS: u32 = 30;

const DATE_FORMAT: &str = "%Y-%m-%d (W%V)";
const TIME_FORMAT: &str = "%H:%M";

pub struct Scheduler {
    config: Config,
    runner: Arc<dyn CommandRunner>,
    bus: Arc<dyn SyncBus>,
    sink: Arc<dyn StatusSink>,
    power_root: PathBuf,
    net_root: PathBuf,
}

impl Scheduler {
    pub fn new(
        config: Config,
        runner: Arc<dyn CommandRunner>,
        bus: Arc<dyn SyncBus>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            config,
            runner,
            bus,
            sink,
            power_root: PathBuf::from(battery::POWER_SUPPLY_ROOT),
            net_root: PathBuf::from(network::NET_CLASS_ROOT),
        }
    }

    #[cfg(test)]
    fn with_roots(mut self, power_root: &std::path::Path, net_root: &std::path::Path) -> Self {
        self.power_root = power_root.to_path_buf();
        self.net_root = net_root.to_path_buf();
        self
    }

    /// Run forever. Termination is external (process signal).
    pub async fn run(&self) {
        self.wait_for_network().await;
        info!(
            "entering status loop, interval {}s",
            self.config.interval.as_secs()
        );

        loop {
            let started = Instant::now();
            let line = self.cycle().await;
            debug!("publishing {line:?}");
            if let Err(e) = self.sink.publish(&line).await {
                warn!("publish failed, retrying next cycle: {e}");
            }
            if let Some(rest) = self.config.interval.checked_sub(started.elapsed()) {
                sleep(rest).await;
            }
        }
    }

    /// One poll+render pass. Always produces a line.
    async fn cycle(&self) -> String {
        let icons = capability::detect(&self.config, self.runner.as_ref()).await;
        let deadline = Instant::now() + cycle_deadline(self.config.interval);

        let power_root = self.power_root.clone();
        let battery_task =
            tokio::task::spawn_blocking(move || battery::poll(&power_root));

        let runner = Arc::clone(&self.runner);
        let wifi_source = self.config.wifi_source;
        let net_root = self.net_root.clone();
        let network_task = tokio::spawn(async move {
            network::poll(runner.as_ref(), wifi_source, &net_root).await
        });

        let runner = Arc::clone(&self.runner);
        let bus = Arc::clone(&self.bus);
        let ping_target = self.config.ping_target.clone();
        let sync_task = tokio::spawn(async move {
            cloudsync::poll(runner.as_ref(), bus.as_ref(), &ping_target).await
        });

        let runner = Arc::clone(&self.runner);
        let volume_task = tokio::spawn(async move { volume::poll(runner.as_ref()).await });

        let readings = Readings {
            volume: collect(deadline, volume_task, "volume").await,
            battery: collect(deadline, battery_task, "battery").await,
            network: collect(deadline, network_task, "network").await,
            sync: collect(deadline, sync_task, "cloudsync").await,
        };

        let now = Local::now();
        render(
            &readings,
            icons,
            &now.format(DATE_FORMAT).to_string(),
            &now.format(TIME_FORMAT).to_string(),
        )
    }

    /// Delay the first cycle until NetworkManager reports a connected
    /// global state, to avoid a transient offline reading right after
    /// boot. Bounded; proceeds anyway on timeout or a missing tool.
    async fn wait_for_network(&self) {
        for _ in 0..STARTUP_POLLS {
            match self
                .runner
                .run("nmcli", &["-t", "-f", "STATE", "general"], PROBE_TIMEOUT)
                .await
            {
                Ok(out) if out.stdout.trim() == "connected" => {
                    info!("network ready, starting cycles");
                    return;
                }
                Ok(_) => {}
                Err(ProbeError::NotFound(_)) => {
                    debug!("nmcli not installed, skipping startup gate");
                    return;
                }
                Err(e) => {
                    warn_once("startup-gate", format!("startup network check failed: {e}"));
                }
            }
            sleep(Duration::from_secs(1)).await;
        }
        warn!("network not ready after {STARTUP_POLLS}s, starting anyway");
    }
}

/// Overall cycle deadline: the interval minus a one-second safety margin,
/// never below one second.
fn cycle_deadline(interval: Duration) -> Duration {
    interval
        .saturating_sub(Duration::from_secs(1))
        .max(Duration::from_secs(1))
}

/// Fan-in for one poller task. A task that outlives the deadline counts
/// as unavailable for this cycle and is not awaited further.
async fn collect<T: Send + 'static>(
    deadline: Instant,
    task: JoinHandle<SourceResult<T>>,
    what: &str,
) -> SourceResult<T> {
    match timeout_at(deadline, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            warn!("{what} poller task failed: {e}");
            SourceResult::Unavailable
        }
        Err(_) => {
            warn_once(
                &format!("{what}-deadline"),
                format!("{what} poller missed the cycle deadline"),
            );
            SourceResult::Unavailable
        }
    }
}
