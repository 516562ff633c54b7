//! Single-flight gates
//!
//! A gate admits one holder at a time and rejects, rather than queues, any
//! other attempt. The returned guard releases the gate on drop, so every exit
//! path of the holder clears it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another holder is active.
    pub fn try_acquire(&self) -> Option<FlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the duration of one operation.
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
    fn second_acquire_is_rejected_until_drop() {
        let gate = SingleFlight::new();
        let guard = gate.try_acquire().expect("idle gate admits");
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());

        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn gates_are_independent() {
        let trigger = SingleFlight::new();
        let reset = SingleFlight::new();
        let _running = trigger.try_acquire().unwrap();
        assert!(reset.try_acquire().is_some());
    }

    #[test]
    fn guard_released_on_panic() {
        let gate = SingleFlight::new();
        let inner = gate.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = inner.try_acquire().unwrap();
            panic!("holder failed");
        });
        assert!(result.is_err());
        assert!(!gate.is_busy());
    }
}
