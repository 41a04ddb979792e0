//! The editable input tape.
//!
//! An `InputTape` holds one input vector per cycle and is never empty. New
//! tapes and appended cycles are defaulted for the device: the active-low
//! `PRE`/`CLR` inputs start high (inactive), everything else low.

use thiserror::Error;

use crate::device::DeviceDescriptor;
use crate::signal::SignalVector;
use crate::types::{Bit, CycleIndex, CLEAR_INPUT, PRESET_INPUT};

/// Number of cycles on a freshly created tape.
pub const DEFAULT_CYCLES: usize = 8;

/// Errors raised by tape edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TapeError {
    #[error("cycle {cycle} is out of range (tape has {len} cycles)")]
    CycleOutOfRange { cycle: CycleIndex, len: usize },

    #[error("'{0}' is not an input of this device")]
    UnknownInput(String),

    #[error("cannot remove the last remaining cycle")]
    LastCycle,
}

/// Result type for tape edits.
pub type TapeResult<T> = Result<T, TapeError>;

/// Default level of an input on a new cycle.
pub fn default_level(input: &str) -> Bit {
    if input == PRESET_INPUT || input == CLEAR_INPUT {
        Bit::High
    } else {
        Bit::Low
    }
}

/// Builds a defaulted input vector for `inputs`.
pub fn default_vector(inputs: &[String]) -> SignalVector {
    inputs
        .iter()
        .map(|name| (name.clone(), default_level(name)))
        .collect()
}

/// Ordered per-cycle input vectors for one device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputTape {
    inputs: Vec<String>,
    cycles: Vec<SignalVector>,
}

impl InputTape {
    /// Creates a defaulted tape with `cycles` cycles (at least one).
    pub fn for_device(device: &DeviceDescriptor, cycles: usize) -> Self {
        let inputs = device.inputs().to_vec();
        let blank = default_vector(&inputs);
        Self {
            cycles: vec![blank; cycles.max(1)],
            inputs,
        }
    }

    /// Creates a tape from explicit vectors, filling unassigned inputs with
    /// their defaults and dropping names the device does not declare.
    ///
    /// An empty `vectors` yields a single defaulted cycle.
    pub fn from_vectors(device: &DeviceDescriptor, vectors: Vec<SignalVector>) -> Self {
        let inputs = device.inputs().to_vec();
        let mut cycles: Vec<SignalVector> = vectors
            .into_iter()
            .map(|v| {
                let mut filled = default_vector(&inputs);
                filled.merge_known(&v);
                filled
            })
            .collect();
        if cycles.is_empty() {
            cycles.push(default_vector(&inputs));
        }
        Self { inputs, cycles }
    }

    /// Replaces the contents with `cycles` defaulted cycles for `device`.
    pub fn reset(&mut self, device: &DeviceDescriptor, cycles: usize) {
        *self = Self::for_device(device, cycles);
    }

    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// Never true: a tape keeps at least one cycle.
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// The input names this tape carries.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// The per-cycle vectors, in cycle order.
    pub fn cycles(&self) -> &[SignalVector] {
        &self.cycles
    }

    pub fn get(&self, cycle: CycleIndex) -> Option<&SignalVector> {
        self.cycles.get(cycle)
    }

    fn check(&self, cycle: CycleIndex, input: &str) -> TapeResult<()> {
        if cycle >= self.cycles.len() {
            return Err(TapeError::CycleOutOfRange {
                cycle,
                len: self.cycles.len(),
            });
        }
        if !self.inputs.iter().any(|n| n == input) {
            return Err(TapeError::UnknownInput(input.to_string()));
        }
        Ok(())
    }

    /// Sets one cell.
    pub fn set(&mut self, cycle: CycleIndex, input: &str, level: Bit) -> TapeResult<()> {
        self.check(cycle, input)?;
        self.cycles[cycle].set(input, level);
        Ok(())
    }

    /// Flips one cell and returns its new level.
    pub fn toggle(&mut self, cycle: CycleIndex, input: &str) -> TapeResult<Bit> {
        self.check(cycle, input)?;
        let next = self.cycles[cycle].level(input).toggled();
        self.cycles[cycle].set(input, next);
        Ok(next)
    }

    /// Appends a defaulted cycle and returns its index.
    pub fn append_cycle(&mut self) -> CycleIndex {
        self.cycles.push(default_vector(&self.inputs));
        self.cycles.len() - 1
    }

    /// Removes a cycle. The last remaining cycle cannot be removed.
    pub fn remove_cycle(&mut self, cycle: CycleIndex) -> TapeResult<SignalVector> {
        if cycle >= self.cycles.len() {
            return Err(TapeError::CycleOutOfRange {
                cycle,
                len: self.cycles.len(),
            });
        }
        if self.cycles.len() == 1 {
            return Err(TapeError::LastCycle);
        }
        Ok(self.cycles.remove(cycle))
    }

    /// Moves the first cycle to the end.
    pub fn rotate(&mut self) {
        self.cycles.rotate_left(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::create_default_catalog;

    fn async_jk_tape(cycles: usize) -> InputTape {
        let catalog = create_default_catalog();
        InputTape::for_device(catalog.get("jk-flip-flop-async").unwrap(), cycles)
    }

    #[test]
    fn test_defaults() {
        let tape = async_jk_tape(3);
        assert_eq!(tape.len(), 3);
        assert_eq!(tape.inputs(), &["J", "K", "PRE", "CLR"]);
        for v in tape.cycles() {
            assert_eq!(v.level("J"), Bit::Low);
            assert_eq!(v.level("PRE"), Bit::High);
            assert_eq!(v.level("CLR"), Bit::High);
        }
    }

    #[test]
    fn test_zero_cycles_clamps_to_one() {
        assert_eq!(async_jk_tape(0).len(), 1);
    }

    #[test]
    fn test_toggle_and_set() {
        let mut tape = async_jk_tape(2);
        assert_eq!(tape.toggle(1, "J"), Ok(Bit::High));
        assert_eq!(tape.toggle(1, "J"), Ok(Bit::Low));
        tape.set(0, "CLR", Bit::Low).unwrap();
        assert_eq!(tape.get(0).unwrap().level("CLR"), Bit::Low);

        assert_eq!(
            tape.toggle(5, "J"),
            Err(TapeError::CycleOutOfRange { cycle: 5, len: 2 })
        );
        assert_eq!(
            tape.set(0, "CLK", Bit::High),
            Err(TapeError::UnknownInput("CLK".to_string()))
        );
    }

    #[test]
    fn test_append_and_remove() {
        let mut tape = async_jk_tape(1);
        assert_eq!(tape.remove_cycle(0), Err(TapeError::LastCycle));

        assert_eq!(tape.append_cycle(), 1);
        assert_eq!(tape.get(1).unwrap().level("PRE"), Bit::High);
        assert!(tape.remove_cycle(0).is_ok());
        assert_eq!(tape.len(), 1);
        assert!(matches!(
            tape.remove_cycle(3),
            Err(TapeError::CycleOutOfRange { .. })
        ));
    }

    #[test]
    fn test_rotate() {
        let mut tape = async_jk_tape(3);
        tape.set(0, "J", Bit::High).unwrap();
        tape.rotate();
        assert_eq!(tape.get(2).unwrap().level("J"), Bit::High);
        assert_eq!(tape.get(0).unwrap().level("J"), Bit::Low);
        tape.rotate();
        tape.rotate();
        assert_eq!(tape.get(0).unwrap().level("J"), Bit::High);
    }

    #[test]
    fn test_from_vectors_fills_defaults() {
        let catalog = create_default_catalog();
        let device = catalog.get("jk-flip-flop-async").unwrap();
        let tape = InputTape::from_vectors(
            device,
            vec![SignalVector::new().with("J", Bit::High).with("Z", Bit::High)],
        );
        let v = tape.get(0).unwrap();
        assert_eq!(v.level("J"), Bit::High);
        assert_eq!(v.level("CLR"), Bit::High);
        assert!(!v.contains("Z"));

        assert_eq!(InputTape::from_vectors(device, Vec::new()).len(), 1);
    }
}
