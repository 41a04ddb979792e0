//! Clock derivation and edge detection.
//!
//! The clock is not an input on the tape: it is derived from cycle parity.
//! With the clock enabled, cycle `i` runs at level `i mod 2` and the half
//! cycle before it ran at `(max(i, 1) - 1) mod 2`, so every other cycle sees
//! a rising edge and the ones in between a falling edge (cycle 0 sees none).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::device::DeviceDescriptor;
use crate::types::{Bit, CycleIndex};

/// Which clock transition triggers an edge-triggered device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockPolarity {
    /// Fires on a 0 -> 1 transition
    #[default]
    Positive,
    /// Fires on a 1 -> 0 transition
    Negative,
}

impl fmt::Display for ClockPolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockPolarity::Positive => f.write_str("positive edge ↑"),
            ClockPolarity::Negative => f.write_str("negative edge ↓"),
        }
    }
}

/// Clock settings for a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default)]
    pub polarity: ClockPolarity,
    /// When false the clock stays low and edge-triggered devices hold.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            polarity: ClockPolarity::Positive,
            enabled: true,
        }
    }
}

impl ClockConfig {
    pub fn new(polarity: ClockPolarity, enabled: bool) -> Self {
        Self { polarity, enabled }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Default settings for a freshly selected device: positive polarity,
    /// clock running unless the device is a latch.
    pub fn for_device(device: &DeviceDescriptor) -> Self {
        Self {
            polarity: ClockPolarity::Positive,
            enabled: !device.is_level_sensitive(),
        }
    }

    /// Returns the clock phase of `cycle` under these settings.
    pub fn phase(&self, cycle: CycleIndex) -> ClockPhase {
        ClockPhase::at(cycle, self.enabled)
    }

    /// True when `phase` is an active edge for these settings.
    pub fn triggers(&self, phase: ClockPhase) -> bool {
        self.enabled && phase.is_edge(self.polarity)
    }
}

/// Clock levels around one cycle: the half cycle before and the cycle
/// itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockPhase {
    pub previous: Bit,
    pub current: Bit,
}

impl ClockPhase {
    pub fn at(cycle: CycleIndex, enabled: bool) -> Self {
        if !enabled {
            return Self {
                previous: Bit::Low,
                current: Bit::Low,
            };
        }
        Self {
            previous: Bit::from((cycle.max(1) - 1) % 2 == 1),
            current: Bit::from(cycle % 2 == 1),
        }
    }

    pub fn is_rising(&self) -> bool {
        self.previous.is_low() && self.current.is_high()
    }

    pub fn is_falling(&self) -> bool {
        self.previous.is_high() && self.current.is_low()
    }

    pub fn is_edge(&self, polarity: ClockPolarity) -> bool {
        match polarity {
            ClockPolarity::Positive => self.is_rising(),
            ClockPolarity::Negative => self.is_falling(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_follows_parity() {
        let phases: Vec<(u8, u8)> = (0..5)
            .map(|i| {
                let p = ClockPhase::at(i, true);
                (u8::from(p.previous), u8::from(p.current))
            })
            .collect();
        assert_eq!(phases, vec![(0, 0), (0, 1), (1, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_disabled_clock_is_flat() {
        for i in 0..6 {
            let p = ClockPhase::at(i, false);
            assert_eq!(p.previous, Bit::Low);
            assert_eq!(p.current, Bit::Low);
        }
        let clock = ClockConfig::disabled();
        assert!(!(0..6).any(|i| clock.triggers(clock.phase(i))));
    }

    #[test]
    fn test_edges_by_polarity() {
        let pos = ClockConfig::new(ClockPolarity::Positive, true);
        let neg = ClockConfig::new(ClockPolarity::Negative, true);

        let pos_edges: Vec<_> = (0..6).filter(|&i| pos.triggers(pos.phase(i))).collect();
        let neg_edges: Vec<_> = (0..6).filter(|&i| neg.triggers(neg.phase(i))).collect();

        assert_eq!(pos_edges, vec![1, 3, 5]);
        assert_eq!(neg_edges, vec![2, 4]);
    }

    #[test]
    fn test_polarity_serde() {
        let json = serde_json::to_string(&ClockPolarity::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
        let cfg: ClockConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ClockConfig::default());
    }
}
