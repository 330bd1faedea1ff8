//! Thermal Memory
//!
//! A glider's private list of thermals it has flown through. Entries age by
//! the elapsed flight time and are forgotten when their TTL runs out, unless
//! the memory retains forever.

use super::geometry::Scalar;
use super::thermal::{Located, Thermal};
use serde::{Deserialize, Serialize};

/// How long a learned thermal is remembered.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Retention {
    Forever,
    /// Each learn or refresh sets the TTL to this value
    Ttl(Scalar),
}

/// A remembered thermal and its remaining time-to-live.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnownThermal {
    pub thermal: Thermal,
    /// `None` under `Retention::Forever`
    pub ttl: Option<Scalar>,
}

impl Located for KnownThermal {
    fn location(&self) -> (Scalar, Scalar) {
        self.thermal.xy()
    }
}

#[derive(Clone, Debug)]
pub struct ThermalMemory {
    retention: Retention,
    entries: Vec<KnownThermal>,
}

impl ThermalMemory {
    pub fn new(retention: Retention) -> Self {
        ThermalMemory {
            retention,
            entries: Vec::new(),
        }
    }

    fn fresh_ttl(&self) -> Option<Scalar> {
        match self.retention {
            Retention::Forever => None,
            Retention::Ttl(ttl) => Some(ttl),
        }
    }

    /// Learn `thermal`, or reset its TTL if it is already known.
    /// Returns `true` when the thermal was new.
    pub fn learn(&mut self, thermal: Thermal) -> bool {
        let ttl = self.fresh_ttl();
        if let Some(known) = self.entries.iter_mut().find(|k| k.thermal == thermal) {
            known.ttl = ttl;
            return false;
        }
        self.entries.push(KnownThermal { thermal, ttl });
        true
    }

    pub fn knows(&self, thermal: &Thermal) -> bool {
        self.entries.iter().any(|k| k.thermal == *thermal)
    }

    /// Age every entry by `elapsed` and drop the ones whose TTL reached zero.
    pub fn decay(&mut self, elapsed: Scalar) {
        for known in &mut self.entries {
            if let Some(ttl) = known.ttl.as_mut() {
                *ttl -= elapsed;
            }
        }
        self.entries.retain(|k| k.ttl.map_or(true, |ttl| ttl > 0.0));
    }

    pub fn entries(&self) -> &[KnownThermal] {
        &self.entries
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learning_twice_refreshes_instead_of_duplicating() {
        let mut memory = ThermalMemory::new(Retention::Ttl(3.0));
        let t = Thermal::new(1.0, 2.0);
        assert!(memory.learn(t));
        memory.decay(2.0);
        assert_eq!(memory.entries()[0].ttl, Some(1.0));
        assert!(!memory.learn(t));
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.entries()[0].ttl, Some(3.0));
    }

    #[test]
    fn decay_purges_every_expired_entry() {
        let mut memory = ThermalMemory::new(Retention::Ttl(1.0));
        // Adjacent entries expiring on the same step must all go
        for i in 0..5 {
            memory.learn(Thermal::new(i as Scalar, 0.0));
        }
        memory.decay(0.5);
        assert_eq!(memory.len(), 5);
        memory.decay(0.5);
        assert!(memory.is_empty());
    }

    #[test]
    fn remaining_entries_always_have_positive_ttl() {
        let mut memory = ThermalMemory::new(Retention::Ttl(2.0));
        for step in 0..40 {
            if step % 3 == 0 {
                memory.learn(Thermal::new(step as Scalar, 1.0));
            }
            memory.decay(0.5);
            assert!(memory.entries().iter().all(|k| k.ttl.unwrap() > 0.0));
        }
        assert!(!memory.is_empty());
    }

    #[test]
    fn forever_never_forgets() {
        let mut memory = ThermalMemory::new(Retention::Forever);
        let t = Thermal::new(500.0, 500.0);
        memory.learn(t);
        for _ in 0..100_000 {
            memory.decay(0.5);
        }
        assert!(memory.knows(&t));
        assert_eq!(memory.entries()[0].ttl, None);
    }
}
