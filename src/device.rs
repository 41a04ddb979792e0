//! Device descriptors and transition rules.
//!
//! A device is an opaque capability bundle for the engine: ordered input and
//! output names, a kind (level-sensitive or edge-triggered) and a pure
//! transition function. Everything else on the descriptor is reference
//! material for display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::catalog::{KMap, ReferenceTable};
use crate::signal::SignalVector;
use crate::types::{CLEAR_INPUT, CLOCK_SIGNAL, PRESET_INPUT};

/// Signature of a transition rule: `(inputs, state) -> partial next state`.
pub type TransitionFn = dyn Fn(&SignalVector, &SignalVector) -> SignalVector + Send + Sync;

/// A shareable, pure transition rule.
///
/// The returned vector may assign any subset of the device outputs; the
/// engine keeps the previous level for the rest.
#[derive(Clone)]
pub struct Transition(Arc<TransitionFn>);

impl Transition {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&SignalVector, &SignalVector) -> SignalVector + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Evaluates the rule.
    pub fn apply(&self, inputs: &SignalVector, state: &SignalVector) -> SignalVector {
        (self.0)(inputs, state)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transition(..)")
    }
}

/// How a device reacts to the clock, with its transition rule.
#[derive(Clone, Debug)]
pub enum DeviceKind {
    /// Level-sensitive: the rule runs on every cycle, the clock is ignored.
    Latch(Transition),
    /// The rule runs only on a detected clock edge.
    EdgeTriggered(Transition),
}

impl DeviceKind {
    pub fn latch<F>(f: F) -> Self
    where
        F: Fn(&SignalVector, &SignalVector) -> SignalVector + Send + Sync + 'static,
    {
        DeviceKind::Latch(Transition::new(f))
    }

    pub fn edge_triggered<F>(f: F) -> Self
    where
        F: Fn(&SignalVector, &SignalVector) -> SignalVector + Send + Sync + 'static,
    {
        DeviceKind::EdgeTriggered(Transition::new(f))
    }

    pub fn transition(&self) -> &Transition {
        match self {
            DeviceKind::Latch(t) | DeviceKind::EdgeTriggered(t) => t,
        }
    }

    pub fn is_level_sensitive(&self) -> bool {
        matches!(self, DeviceKind::Latch(_))
    }
}

/// Catalog grouping of a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceCategory {
    Latch,
    FlipFlop,
    Counter,
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeviceCategory::Latch => "Latch",
            DeviceCategory::FlipFlop => "Flip-Flop",
            DeviceCategory::Counter => "Counter",
        };
        f.write_str(label)
    }
}

/// Static description of a sequential-logic device.
#[derive(Clone, Debug)]
pub struct DeviceDescriptor {
    /// Stable identifier (e.g. `"jk-flip-flop-pe"`)
    pub id: String,
    /// Display name
    pub name: String,
    pub category: DeviceCategory,
    pub description: String,
    /// Behavior and transition rule
    pub kind: DeviceKind,
    inputs: Vec<String>,
    outputs: Vec<String>,
    pub characteristic_table: ReferenceTable,
    pub excitation_table: ReferenceTable,
    pub characteristic_equation: String,
    pub kmap: Option<KMap>,
}

impl DeviceDescriptor {
    /// Creates a descriptor with no signals and empty reference material.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: DeviceCategory,
        kind: DeviceKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            description: String::new(),
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
            characteristic_table: ReferenceTable::default(),
            excitation_table: ReferenceTable::default(),
            characteristic_equation: String::new(),
            kmap: None,
        }
    }

    /// Adds an input. The clock is implicit, so `CLK` is dropped; duplicate
    /// names are ignored.
    pub fn with_input(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if name == CLOCK_SIGNAL {
            tracing::trace!(device = %self.id, "clock is implicit, dropping CLK input");
        } else if !self.inputs.contains(&name) {
            self.inputs.push(name);
        }
        self
    }

    pub fn with_inputs<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |d, n| d.with_input(n))
    }

    /// Adds an output; duplicate names are ignored.
    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.outputs.contains(&name) {
            self.outputs.push(name);
        }
        self
    }

    pub fn with_outputs<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |d, n| d.with_output(n))
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn with_characteristic_table(mut self, table: ReferenceTable) -> Self {
        self.characteristic_table = table;
        self
    }

    pub fn with_excitation_table(mut self, table: ReferenceTable) -> Self {
        self.excitation_table = table;
        self
    }

    pub fn with_equation(mut self, equation: impl Into<String>) -> Self {
        self.characteristic_equation = equation.into();
        self
    }

    pub fn with_kmap(mut self, kmap: KMap) -> Self {
        self.kmap = Some(kmap);
        self
    }

    /// Ordered input names, without the clock.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Ordered output names.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn is_level_sensitive(&self) -> bool {
        self.kind.is_level_sensitive()
    }

    pub fn has_input(&self, name: &str) -> bool {
        self.inputs.iter().any(|n| n == name)
    }

    /// True when the device declares both active-low overrides.
    pub fn has_async_overrides(&self) -> bool {
        self.has_input(PRESET_INPUT) && self.has_input(CLEAR_INPUT)
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] inputs: [{}] outputs: [{}]",
            self.name,
            self.category,
            self.inputs.join(", "),
            self.outputs.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bit;

    fn buffer() -> DeviceDescriptor {
        DeviceDescriptor::new(
            "buf",
            "Buffer latch",
            DeviceCategory::Latch,
            DeviceKind::latch(|inputs, _| SignalVector::new().with("Q", inputs.level("A"))),
        )
        .with_inputs(["A", "CLK", "A"])
        .with_output("Q")
    }

    #[test]
    fn test_descriptor_drops_clock_and_duplicates() {
        let desc = buffer();
        assert_eq!(desc.inputs(), &["A".to_string()]);
        assert_eq!(desc.outputs(), &["Q".to_string()]);
        assert!(desc.is_level_sensitive());
        assert!(!desc.has_async_overrides());
    }

    #[test]
    fn test_transition_apply() {
        let desc = buffer();
        let inputs = SignalVector::new().with("A", Bit::High);
        let next = desc
            .kind
            .transition()
            .apply(&inputs, &SignalVector::zeroed(["Q"]));
        assert_eq!(next.level("Q"), Bit::High);
    }

    #[test]
    fn test_async_detection() {
        let desc = DeviceDescriptor::new(
            "ff",
            "FF",
            DeviceCategory::FlipFlop,
            DeviceKind::edge_triggered(|_, s| s.clone()),
        )
        .with_inputs(["PRE", "CLR"]);
        assert!(desc.has_async_overrides());
        assert!(!desc.is_level_sensitive());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(DeviceCategory::FlipFlop.to_string(), "Flip-Flop");
    }
}
