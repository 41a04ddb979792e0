//! Core type definitions for the waveform simulator.
//!
//! This module defines the fundamental types used throughout the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a sample on the waveform time axis, in cycles.
///
/// Cycle `i` owns the interval `[i, i + 1)`; the engine samples it twice,
/// at `i` and at `i + POST_EDGE_OFFSET`.
pub type SampleTime = f64;

/// Index of a cycle on the input tape.
pub type CycleIndex = usize;

/// Offset of the post-edge sample inside a cycle.
pub const POST_EDGE_OFFSET: SampleTime = 0.99;

/// Name of the implicit clock signal.
pub const CLOCK_SIGNAL: &str = "CLK";

/// Active-low asynchronous preset input.
pub const PRESET_INPUT: &str = "PRE";

/// Active-low asynchronous clear input.
pub const CLEAR_INPUT: &str = "CLR";

/// A binary signal level.
///
/// Serialized as the integers `0` and `1` so sample points plot directly.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Bit {
    #[default]
    Low,
    High,
}

impl Bit {
    /// Returns the opposite level.
    pub fn toggled(self) -> Self {
        match self {
            Bit::Low => Bit::High,
            Bit::High => Bit::Low,
        }
    }

    pub fn is_high(self) -> bool {
        self == Bit::High
    }

    pub fn is_low(self) -> bool {
        self == Bit::Low
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value {
            Bit::High
        } else {
            Bit::Low
        }
    }
}

impl From<Bit> for bool {
    fn from(bit: Bit) -> Self {
        bit.is_high()
    }
}

impl From<Bit> for u8 {
    fn from(bit: Bit) -> Self {
        match bit {
            Bit::Low => 0,
            Bit::High => 1,
        }
    }
}

impl TryFrom<u8> for Bit {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Bit::Low),
            1 => Ok(Bit::High),
            other => Err(format!("signal level must be 0 or 1, got {}", other)),
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}
