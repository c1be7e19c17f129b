//! Single-flight guard for long-running external operations
//!
//! Only one operation may run at a time. A second request is rejected, not
//! queued.

use crate::error::{PlaybackError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "is something running" flag
#[derive(Debug, Clone)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
    label: &'static str,
}

impl SingleFlight {
    /// `label` names the operation in the rejection error ("Download")
    pub fn new(label: &'static str) -> Self {
        Self {
            busy: Arc::new(AtomicBool::new(false)),
            label,
        }
    }

    /// Claim the slot
    ///
    /// The slot is released when the returned guard is dropped.
    pub fn try_begin(&self) -> Result<FlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PlaybackError::AlreadyInProgress(self.label))?;

        Ok(FlightGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the slot on drop
#[derive(Debug)]
pub struct FlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_request_is_rejected() {
        let flight = SingleFlight::new("Download");
        let guard = flight.try_begin().unwrap();

        let err = flight.try_begin().unwrap_err();
        assert!(matches!(err, PlaybackError::AlreadyInProgress("Download")));
        assert_eq!(err.to_string(), "Download already in progress");

        drop(guard);
        assert!(!flight.is_busy());
        assert!(flight.try_begin().is_ok());
    }

    #[test]
    fn clones_share_the_slot() {
        let flight = SingleFlight::new("Download");
        let other = flight.clone();
        let _guard = flight.try_begin().unwrap();

        assert!(other.is_busy());
        assert!(other.try_begin().is_err());
    }

    #[test]
    fn guard_moves_across_threads() {
        let flight = SingleFlight::new("Download");
        let guard = flight.try_begin().unwrap();

        std::thread::spawn(move || drop(guard)).join().unwrap();
        assert!(!flight.is_busy());
    }
}
