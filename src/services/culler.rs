//! Background task evicting devices that stopped refreshing.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::data::registry::Registry;

/// Spawn the periodic cull loop.
///
/// The first pass runs one `period` after spawning. The task exits once
/// `shutdown` changes or its sender is dropped.
pub fn spawn_culler(
    registry: Arc<Registry>,
    period: Duration,
    max_age: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(?period, ?max_age, "culler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = registry.cull(max_age);
                    info!(
                        removed = report.devices_removed,
                        partitions_dropped = report.partitions_dropped,
                        remaining = registry.device_count(),
                        "culled inactive devices"
                    );
                }
                _ = shutdown.changed() => {
                    debug!("culler stopping");
                    break;
                }
            }
        }
    })
}
