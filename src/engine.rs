//! The waveform simulation engine.
//!
//! `run` replays an input tape against a device from the all-zero state and
//! samples every signal twice per cycle: once before the cycle's update
//! (`time = i`, previous clock phase) and once after it
//! (`time = i + 0.99`, current clock phase). The engine keeps no state
//! between runs, so the same arguments always produce the same waveform.
//!
//! # Example
//!
//! ```
//! use seqwave::catalog::create_default_catalog;
//! use seqwave::clock::ClockConfig;
//! use seqwave::engine;
//! use seqwave::tape::InputTape;
//! use seqwave::types::Bit;
//!
//! let catalog = create_default_catalog();
//! let dff = catalog.get("d-flip-flop-pe").unwrap();
//!
//! let mut tape = InputTape::for_device(dff, 4);
//! for cycle in 1..4 {
//!     tape.set(cycle, "D", Bit::High).unwrap();
//! }
//!
//! let wave = engine::run(dff, tape.cycles(), ClockConfig::default()).unwrap();
//! assert_eq!(wave.len(), 8);
//! assert_eq!(wave.final_state().unwrap().level("Q"), Bit::High);
//! ```

use thiserror::Error;

use crate::clock::ClockConfig;
use crate::device::{DeviceDescriptor, DeviceKind};
use crate::signal::SignalVector;
use crate::types::{Bit, CycleIndex, SampleTime, CLEAR_INPUT, POST_EDGE_OFFSET, PRESET_INPUT};
use crate::waveform::{RunStats, SamplePoint, Waveform};

/// Errors raised by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A cycle's input vector lacks a declared input.
    #[error("cycle {cycle} has no value for input '{input}'")]
    InvalidInput { cycle: CycleIndex, input: String },
}

/// Result type for engine operations.
pub type SimResult<T> = Result<T, SimError>;

/// Resolves the active-low PRE/CLR pair.
///
/// Returns the forced assignment of the primary (first) and complemented
/// (second) outputs, or `None` when both overrides are inactive.
pub fn async_override(device: &DeviceDescriptor, inputs: &SignalVector) -> Option<SignalVector> {
    let pre = inputs.get(PRESET_INPUT)?;
    let clr = inputs.get(CLEAR_INPUT)?;

    let (primary, complement) = match (pre, clr) {
        (Bit::High, Bit::High) => return None,
        // Both asserted: the invalid state, modeled as both outputs high.
        (Bit::Low, Bit::Low) => (Bit::High, Bit::High),
        (Bit::Low, Bit::High) => (Bit::High, Bit::Low),
        (Bit::High, Bit::Low) => (Bit::Low, Bit::High),
    };

    let outputs = device.outputs();
    let mut forced = SignalVector::new();
    if let Some(q) = outputs.first() {
        forced.set(q.clone(), primary);
    }
    if let Some(q_bar) = outputs.get(1) {
        forced.set(q_bar.clone(), complement);
    }
    Some(forced)
}

/// Runs `device` over `tape` and returns the sampled waveform.
///
/// Every vector on the tape must assign every input the device declares;
/// extra names are ignored.
///
/// # Errors
/// `SimError::InvalidInput` for the first cycle missing a declared input.
pub fn run(
    device: &DeviceDescriptor,
    tape: &[SignalVector],
    clock: ClockConfig,
) -> SimResult<Waveform> {
    let mut state = SignalVector::zeroed(device.outputs().iter().cloned());
    let mut samples = Vec::with_capacity(tape.len() * 2);
    let mut stats = RunStats::default();
    let has_async = device.has_async_overrides();

    for (cycle, vector) in tape.iter().enumerate() {
        if let Some(input) = vector.first_missing(device.inputs()) {
            tracing::warn!(device = %device.id, cycle, input, "input vector is incomplete");
            return Err(SimError::InvalidInput {
                cycle,
                input: input.to_string(),
            });
        }
        let inputs = vector.project(device.inputs());
        let phase = clock.phase(cycle);
        let time = cycle as SampleTime;

        samples.push(SamplePoint::new(
            time,
            phase.previous,
            inputs.clone(),
            state.clone(),
        ));

        let forced = if has_async {
            async_override(device, &inputs)
        } else {
            None
        };

        match forced {
            Some(forced) => {
                state.merge_known(&forced);
                stats.async_overrides += 1;
            }
            None => {
                let fires = match &device.kind {
                    DeviceKind::Latch(_) => true,
                    DeviceKind::EdgeTriggered(_) => clock.triggers(phase),
                };
                if fires {
                    let next = device.kind.transition().apply(&inputs, &state);
                    state.merge_known(&next);
                    stats.transitions_fired += 1;
                }
            }
        }

        tracing::trace!(
            cycle,
            clk = %phase.current,
            inputs = %inputs,
            state = %state,
            "cycle evaluated"
        );

        samples.push(SamplePoint::new(
            time + POST_EDGE_OFFSET,
            phase.current,
            inputs,
            state.clone(),
        ));
    }

    stats.cycles = tape.len();
    tracing::debug!(
        device = %device.id,
        cycles = stats.cycles,
        transitions = stats.transitions_fired,
        overrides = stats.async_overrides,
        "simulation run complete"
    );

    Ok(Waveform::new(device, samples, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockPolarity;
    use crate::device::DeviceCategory;

    fn follower() -> DeviceDescriptor {
        DeviceDescriptor::new(
            "follower",
            "Follower",
            DeviceCategory::FlipFlop,
            DeviceKind::edge_triggered(|inputs, _| SignalVector::new().with("Q", inputs.level("D"))),
        )
        .with_input("D")
        .with_output("Q")
    }

    fn tape_of(bits: &[u8]) -> Vec<SignalVector> {
        bits.iter()
            .map(|&b| SignalVector::new().with("D", Bit::from(b == 1)))
            .collect()
    }

    #[test]
    fn test_sample_times_interleave() {
        let wave = run(&follower(), &tape_of(&[0, 1, 0]), ClockConfig::default()).unwrap();
        let times: Vec<f64> = wave.samples.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0.0, 0.99, 1.0, 1.99, 2.0, 2.99]);
    }

    #[test]
    fn test_pre_edge_sample_shows_previous_state() {
        let wave = run(&follower(), &tape_of(&[1, 1, 0, 0]), ClockConfig::default()).unwrap();
        // rising edge on cycle 1 latches D=1
        assert_eq!(wave.samples[2].outputs.level("Q"), Bit::Low);
        assert_eq!(wave.samples[3].outputs.level("Q"), Bit::High);
        assert_eq!(wave.samples[2].clock, Bit::Low);
        assert_eq!(wave.samples[3].clock, Bit::High);
    }

    #[test]
    fn test_negative_polarity_fires_on_even_cycles() {
        let clock = ClockConfig::new(ClockPolarity::Negative, true);
        let wave = run(&follower(), &tape_of(&[1, 1, 1, 0]), clock).unwrap();
        assert_eq!(wave.stats.transitions_fired, 1);
        let qs: Vec<Bit> = wave.states_after_cycles().map(|s| s.level("Q")).collect();
        assert_eq!(qs, vec![Bit::Low, Bit::Low, Bit::High, Bit::High]);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let tape = vec![SignalVector::new().with("D", Bit::High).with("X", Bit::High)];
        let wave = run(&follower(), &tape, ClockConfig::default()).unwrap();
        assert!(!wave.samples[0].inputs.contains("X"));
    }

    #[test]
    fn test_missing_key_is_invalid_input() {
        let tape = vec![
            SignalVector::new().with("D", Bit::Low),
            SignalVector::new().with("E", Bit::Low),
        ];
        let err = run(&follower(), &tape, ClockConfig::default()).unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidInput {
                cycle: 1,
                input: "D".to_string()
            }
        );
        assert_eq!(err.to_string(), "cycle 1 has no value for input 'D'");
    }

    #[test]
    fn test_empty_tape_yields_empty_waveform() {
        let wave = run(&follower(), &[], ClockConfig::default()).unwrap();
        assert!(wave.is_empty());
        assert_eq!(wave.stats.cycles, 0);
    }

    #[test]
    fn test_async_override_table() {
        let ff = DeviceDescriptor::new(
            "ff",
            "FF",
            DeviceCategory::FlipFlop,
            DeviceKind::edge_triggered(|_, s| s.clone()),
        )
        .with_inputs(["PRE", "CLR"])
        .with_outputs(["Q", "Q'"]);

        let case = |pre: Bit, clr: Bit| {
            async_override(&ff, &SignalVector::new().with("PRE", pre).with("CLR", clr))
                .map(|v| (v.level("Q"), v.level("Q'")))
        };

        assert_eq!(case(Bit::Low, Bit::Low), Some((Bit::High, Bit::High)));
        assert_eq!(case(Bit::Low, Bit::High), Some((Bit::High, Bit::Low)));
        assert_eq!(case(Bit::High, Bit::Low), Some((Bit::Low, Bit::High)));
        assert_eq!(case(Bit::High, Bit::High), None);
    }
}
