// radar_core/src/snapshot.rs

use crate::messages::RadarScan;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Latest {
    scan: Option<RadarScan>,
    published: u64,
}

/// The latest completed scan of one radar, shared with other threads.
///
/// Clones share the same slot. The tick thread publishes once per finished
/// scan; readers copy the scan out and never hold the lock across work.
#[derive(Debug, Clone, Default)]
pub struct ScanSnapshot {
    inner: Arc<Mutex<Latest>>,
}

impl ScanSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, scan: RadarScan) {
        let mut latest = self.inner.lock();
        latest.scan = Some(scan);
        latest.published += 1;
    }

    pub fn latest(&self) -> Option<RadarScan> {
        self.inner.lock().scan.clone()
    }

    /// Number of scans published so far.
    pub fn published(&self) -> u64 {
        self.inner.lock().published
    }
}
