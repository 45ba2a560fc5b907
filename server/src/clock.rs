//! Wall-clock sources.
//!
//! The engine never reads time on its own, so the node hands it timestamps
//! from a [`Clock`]. Production uses local time; tests drive a
//! [`ManualClock`].

use branchsync_engine::{Timestamp, TIMESTAMP_FORMAT};
use std::sync::Mutex;

/// A source of second-resolution timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Result<Timestamp, branchsync_engine::Error>;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<Timestamp, branchsync_engine::Error> {
        Timestamp::parse(&chrono::Local::now().format(TIMESTAMP_FORMAT).to_string())
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Parse `start` and build a clock at that instant.
    pub fn at(start: &str) -> Result<Self, branchsync_engine::Error> {
        Ok(Self::new(Timestamp::parse(start)?))
    }

    /// Move the clock to `to`.
    pub fn set(&self, to: Timestamp) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Result<Timestamp, branchsync_engine::Error> {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        Ok(current.clone())
    }
}
