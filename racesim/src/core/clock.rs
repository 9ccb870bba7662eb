use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Clock provides the wall-clock time (ms since the Unix epoch) that is used for lap timing and
/// snapshot timestamps.
pub trait Clock: Send {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// ManualClock only moves when it is advanced explicitly. Clones share the same time, such that
/// a handle can be kept outside of the simulation that owns the clock.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    t_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(t_start_ms: u64) -> ManualClock {
        ManualClock {
            t_ms: Arc::new(AtomicU64::new(t_start_ms)),
        }
    }

    pub fn advance(&self, dt_ms: u64) {
        self.t_ms.fetch_add(dt_ms, Ordering::SeqCst);
    }

    pub fn set(&self, t_ms: u64) {
        self.t_ms.store(t_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.t_ms.load(Ordering::SeqCst)
    }
}
