//! The bridge driver: discovery, scheduling and shutdown wired together.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use super::shutdown::Shutdown;
use crate::config::BridgeConfig;
use crate::core::{BridgeResult, IdentitySource, TelemetrySource};
use crate::discovery::{DiscoveryBroadcaster, DiscoveryListener};
use crate::session::SendScheduler;
use crate::transport::{ConnectionManager, Connector};

/// Capacity of the discovery event queue.
const EVENT_QUEUE_CAPACITY: usize = 16;

/// How long a background task gets to stop before it is aborted.
const TASK_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Runs the bridge until shutdown.
///
/// A single driver task owns the session. The discovery listener (and the
/// optional broadcaster) run as separate tasks and only communicate through a
/// channel and the shared [`Shutdown`] signal.
#[derive(Debug, Clone)]
pub struct Bridge {
    config: BridgeConfig,
}

impl Bridge {
    /// Create a bridge with the given settings.
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// Bind the discovery port and run until `shutdown` is triggered.
    ///
    /// Fails only if the discovery port cannot be bound.
    pub async fn run<C, T, I>(
        self,
        connector: C,
        telemetry: T,
        identity: I,
        shutdown: Shutdown,
    ) -> BridgeResult<()>
    where
        C: Connector,
        T: TelemetrySource,
        I: IdentitySource,
    {
        let listener = DiscoveryListener::bind(self.config.udp_port).await?;
        self.run_with_listener(listener, connector, telemetry, identity, shutdown)
            .await
    }

    /// Run with an already bound listener.
    pub async fn run_with_listener<C, T, I>(
        self,
        listener: DiscoveryListener,
        connector: C,
        telemetry: T,
        mut identity: I,
        shutdown: Shutdown,
    ) -> BridgeResult<()>
    where
        C: Connector,
        T: TelemetrySource,
        I: IdentitySource,
    {
        let interval = self.config.interval();
        info!(
            port = self.config.udp_port,
            interval_ms = interval.as_millis() as u64,
            "starting bridge"
        );
        info!(addr = %listener.local_addr()?, "listening for discovery");

        let (events_tx, mut events) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let listener_task = listener.spawn(events_tx, shutdown.clone());

        let broadcaster_task = if self.config.send_discovery {
            let lan_address = identity.lan_address().await;
            match DiscoveryBroadcaster::bind(self.config.udp_port, &lan_address).await {
                Ok(broadcaster) => Some(broadcaster.spawn(shutdown.clone())),
                Err(e) => {
                    warn!(error = %e, "active discovery unavailable");
                    None
                }
            }
        } else {
            None
        };

        let connection =
            ConnectionManager::new(connector).with_connect_timeout(self.config.connect_timeout());
        let mut scheduler = SendScheduler::new(connection, telemetry, identity);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.wait() => break,

                Some(event) = events.recv() => {
                    scheduler.set_target(&event.address).await;
                }

                _ = ticker.tick() => {
                    // In-flight connect or send work is abandoned on shutdown.
                    tokio::select! {
                        biased;
                        _ = shutdown.wait() => break,
                        outcome = scheduler.tick() => trace!(?outcome, "tick"),
                    }
                }
            }
        }

        info!("shutting down");
        shutdown.trigger();
        scheduler.close().await;
        join_task("discovery listener", listener_task).await;
        if let Some(task) = broadcaster_task {
            join_task("discovery broadcaster", task).await;
        }
        info!("stopped");
        Ok(())
    }
}

/// Wait briefly for a background task, aborting it if it does not finish.
async fn join_task(name: &'static str, mut task: JoinHandle<()>) {
    match tokio::time::timeout(TASK_JOIN_TIMEOUT, &mut task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(task = name, error = %e, "task ended abnormally"),
        Err(_) => {
            debug!(task = name, "task did not stop in time; aborting");
            task.abort();
        }
    }
}
