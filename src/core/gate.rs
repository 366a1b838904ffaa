// src/core/gate.rs
//! Single-flight gate for the outbound generation call

use std::sync::atomic::{AtomicBool, Ordering};

/// Busy flag allowing one outstanding generation request at a time. Both
/// generation operations share one gate; whichever acquires it first wins
/// and the other reports busy.
#[derive(Debug, Default)]
pub struct GenerationGate {
    busy: AtomicBool,
}

impl GenerationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the gate, or `None` if a generation is already in flight.
    /// The permit releases the gate when dropped.
    pub fn try_acquire(&self) -> Option<GenerationPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .ok()
            .map(|_| GenerationPermit { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

pub struct GenerationPermit<'a> {
    gate: &'a GenerationGate,
}

impl Drop for GenerationPermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let gate = GenerationGate::new();
        assert!(!gate.is_busy());

        let permit = gate.try_acquire().unwrap();
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());

        drop(permit);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn test_release_on_early_return() {
        let gate = GenerationGate::new();

        fn failing_call(gate: &GenerationGate) -> anyhow::Result<()> {
            let _permit = gate.try_acquire().unwrap();
            anyhow::bail!("network down")
        }

        assert!(failing_call(&gate).is_err());
        assert!(!gate.is_busy());
    }
}
