//! In-memory device registry partitioned by observed client address.
//!
//! Every device lives inside the partition of the address it registered from.
//! A partition is only ever visible to callers resolving to the same address,
//! so devices on one network never leak into discovery on another.
//!
//! Growth is unbounded between cull passes: many distinct addresses or ids
//! will grow the map until [`Registry::cull`] runs.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::data::clock::{Clock, SystemClock};

/// A device advertised by a client on some network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Unique within its partition
    pub id: String,
    /// Human readable label
    pub name: String,
    /// Address the device wants to advertise, usually `host:port`
    pub address: String,
    /// Time of the last registration for this id
    pub updated: DateTime<Utc>,
}

/// Outcome of one [`Registry::cull`] pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CullReport {
    pub devices_removed: usize,
    pub partitions_dropped: usize,
}

type Partition = BTreeMap<String, DeviceRecord>;

/// Partitioned device store.
///
/// Each partition sits behind one shard lock of the underlying map, and every
/// operation below touches a partition only while holding that lock.
#[derive(Debug)]
pub struct Registry {
    partitions: DashMap<String, Partition>,
    clock: Arc<dyn Clock>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            partitions: DashMap::new(),
            clock,
        }
    }

    /// Insert or overwrite a device in `partition`.
    ///
    /// A missing or empty `id` falls back to `name`. Inputs are stored exactly
    /// as given; this never fails. Returns the id the device was stored under.
    pub fn register(&self, partition: &str, id: Option<&str>, name: &str, address: &str) -> String {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => name,
        };

        let mut devices = self.partitions.entry(partition.to_string()).or_default();
        // stamped under the partition lock so `updated` follows write order
        let record = DeviceRecord {
            id: id.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            updated: self.clock.now(),
        };
        trace!(partition, id, "registering device");
        devices.insert(record.id.clone(), record);
        id.to_string()
    }

    /// Snapshot of every device in `partition`, ordered by id.
    ///
    /// Unknown partitions yield an empty list.
    pub fn discover(&self, partition: &str) -> Vec<DeviceRecord> {
        self.partitions
            .get(partition)
            .map(|devices| devices.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove devices not refreshed within `max_age`.
    ///
    /// A device exactly `max_age` old survives. Partitions left empty are
    /// dropped.
    pub fn cull(&self, max_age: Duration) -> CullReport {
        let now = self.clock.now();
        let max_age = TimeDelta::from_std(max_age).unwrap_or(TimeDelta::MAX);
        let Some(cutoff) = now.checked_sub_signed(max_age) else {
            return CullReport::default();
        };

        let mut report = CullReport::default();
        self.partitions.retain(|_, devices| {
            let before = devices.len();
            devices.retain(|_, device| device.updated >= cutoff);
            report.devices_removed += before - devices.len();

            if devices.is_empty() {
                report.partitions_dropped += 1;
                false
            } else {
                true
            }
        });
        report
    }

    /// Number of non-empty partitions.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Number of devices across all partitions.
    pub fn device_count(&self) -> usize {
        self.partitions.iter().map(|entry| entry.value().len()).sum()
    }
}
