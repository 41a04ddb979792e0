//! Sampled waveforms and their exports.
//!
//! A `Waveform` is the engine's output: two `SamplePoint`s per cycle plus
//! the ordered list of signals to plot and the counters of the run.

use serde::Serialize;
use std::fmt::Write as _;

use crate::device::DeviceDescriptor;
use crate::signal::SignalVector;
use crate::types::{Bit, SampleTime, CLOCK_SIGNAL};

/// Plot colours, assigned to signals by display index.
pub const SIGNAL_COLORS: [&str; 8] = [
    "#38bdf8", "#fb923c", "#f87171", "#a78bfa", "#4ade80", "#fbbf24", "#e879f9", "#34d399",
];

/// One timestamped snapshot of every signal.
///
/// Serializes flat, as `{"time": .., "CLK": .., "<input>": .., "<output>": ..}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SamplePoint {
    pub time: SampleTime,
    #[serde(rename = "CLK")]
    pub clock: Bit,
    #[serde(flatten)]
    pub inputs: SignalVector,
    #[serde(flatten)]
    pub outputs: SignalVector,
}

impl SamplePoint {
    pub fn new(time: SampleTime, clock: Bit, inputs: SignalVector, outputs: SignalVector) -> Self {
        Self {
            time,
            clock,
            inputs,
            outputs,
        }
    }

    /// Looks up a signal by name: the clock, then outputs, then inputs.
    pub fn value(&self, signal: &str) -> Option<Bit> {
        if signal == CLOCK_SIGNAL {
            return Some(self.clock);
        }
        self.outputs.get(signal).or_else(|| self.inputs.get(signal))
    }
}

/// Counters collected during one engine run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Cycles replayed
    pub cycles: usize,
    /// Transition rule invocations
    pub transitions_fired: u64,
    /// Cycles where PRE/CLR overrode the rule
    pub async_overrides: u64,
}

/// Where and how a signal is drawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignalTrace {
    pub name: String,
    /// Vertical row, counted from the bottom; the first signal is on top.
    pub row: usize,
    pub color: &'static str,
}

/// The full output of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Waveform {
    pub device_id: String,
    /// Signals in display order: clock (edge-triggered devices only),
    /// inputs, outputs.
    pub signals: Vec<String>,
    pub samples: Vec<SamplePoint>,
    pub stats: RunStats,
}

impl Waveform {
    pub fn new(device: &DeviceDescriptor, samples: Vec<SamplePoint>, stats: RunStats) -> Self {
        let mut signals = Vec::with_capacity(device.inputs().len() + device.outputs().len() + 1);
        if !device.is_level_sensitive() {
            signals.push(CLOCK_SIGNAL.to_string());
        }
        signals.extend(device.inputs().iter().cloned());
        signals.extend(device.outputs().iter().cloned());

        Self {
            device_id: device.id.clone(),
            signals,
            samples,
            stats,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time at which the trace ends (the number of cycles).
    pub fn duration(&self) -> SampleTime {
        self.stats.cycles as SampleTime
    }

    /// Row and colour for every displayed signal.
    pub fn layout(&self) -> Vec<SignalTrace> {
        let n = self.signals.len();
        self.signals
            .iter()
            .enumerate()
            .map(|(i, name)| SignalTrace {
                name: name.clone(),
                row: n - 1 - i,
                color: SIGNAL_COLORS[i % SIGNAL_COLORS.len()],
            })
            .collect()
    }

    /// The `(time, level)` series of one signal, for a step plot.
    pub fn series(&self, signal: &str) -> Vec<(SampleTime, Bit)> {
        self.samples
            .iter()
            .filter_map(|s| s.value(signal).map(|v| (s.time, v)))
            .collect()
    }

    /// Output state after each cycle (the post-edge samples).
    pub fn states_after_cycles(&self) -> impl Iterator<Item = &SignalVector> {
        self.samples.iter().skip(1).step_by(2).map(|s| &s.outputs)
    }

    /// Output state at the end of the trace.
    pub fn final_state(&self) -> Option<&SignalVector> {
        self.samples.last().map(|s| &s.outputs)
    }

    /// Samples whose time falls within `[min, max]`.
    pub fn window(&self, min: SampleTime, max: SampleTime) -> &[SamplePoint] {
        let start = self.samples.partition_point(|s| s.time < min);
        let end = self.samples.partition_point(|s| s.time <= max);
        &self.samples[start..end.max(start)]
    }

    /// Exports run counters in the same shape as other stats exports.
    pub fn export_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "device": self.device_id,
            "cycles": self.stats.cycles,
            "samples": self.samples.len(),
            "transitions_fired": self.stats.transitions_fired,
            "async_overrides": self.stats.async_overrides,
        })
    }

    /// Exports the waveform to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Exports the displayed signals to CSV, one sample per line.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("time");
        for name in &self.signals {
            csv.push(',');
            csv.push_str(name);
        }
        csv.push('\n');

        for sample in &self.samples {
            let _ = write!(csv, "{:.2}", sample.time);
            for name in &self.signals {
                let level = sample.value(name).map(u8::from).unwrap_or(0);
                let _ = write!(csv, ",{}", level);
            }
            csv.push('\n');
        }

        csv
    }

    /// Renders the post-edge level of each signal per cycle as text, one
    /// row per signal.
    pub fn render_text(&self) -> String {
        let width = self.signals.iter().map(|s| s.chars().count()).max().unwrap_or(0);
        let mut out = String::new();
        for name in &self.signals {
            let _ = write!(out, "{:>width$} ", name, width = width);
            for sample in self.samples.iter().skip(1).step_by(2) {
                let glyph = match sample.value(name) {
                    Some(Bit::High) => '‾',
                    _ => '_',
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}
