//! Device catalog and reference material.
//!
//! The catalog is a read-only, ordered collection of device descriptors,
//! looked up by id or filtered by name. `create_default_catalog` returns the
//! built-in latches, flip-flops and ripple counters.
//!
//! # Example
//!
//! ```
//! use seqwave::catalog::create_default_catalog;
//!
//! let catalog = create_default_catalog();
//! let jk = catalog.get("jk-flip-flop-pe").unwrap();
//! assert_eq!(jk.inputs(), &["J".to_string(), "K".to_string()]);
//!
//! let hits: Vec<_> = catalog.search("counter").map(|d| d.id.as_str()).collect();
//! assert_eq!(hits, vec!["up-counter-jk", "down-counter-jk"]);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::device::{DeviceCategory, DeviceDescriptor, DeviceKind};
use crate::signal::SignalVector;
use crate::types::Bit;

/// A small text table (truth, characteristic or excitation table).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReferenceTable {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Short rows are padded with empty cells, long rows are
    /// truncated to the column count.
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the cell at `row` under `column`, if that row has one.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }
}

impl fmt::Display for ReferenceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "No data available.");
        }

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                self.rows
                    .iter()
                    .map(|r| r.get(i).map_or(0, |cell| cell.chars().count()))
                    .chain(std::iter::once(c.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let rule: String = widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+");

        writeln!(f, "+{}+", rule)?;
        write!(f, "|")?;
        for (c, w) in self.columns.iter().zip(&widths) {
            write!(f, " {:<width$} |", c, width = w)?;
        }
        writeln!(f)?;
        writeln!(f, "+{}+", rule)?;
        for row in &self.rows {
            write!(f, "|")?;
            // rows shorter than the header render as blank cells
            for (i, w) in widths.iter().enumerate() {
                let cell = row.get(i).map_or("", String::as_str);
                write!(f, " {:<width$} |", cell, width = w)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "+{}+", rule)
    }
}

/// Karnaugh map cells with the minimized equation they yield.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KMap {
    pub cells: Vec<Vec<String>>,
    pub equation: String,
}

impl KMap {
    pub fn new<R, C, S>(cells: R, equation: impl Into<String>) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells
                .into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
            equation: equation.into(),
        }
    }
}

/// An ordered, id-indexed collection of devices.
#[derive(Default)]
pub struct DeviceCatalog {
    devices: Vec<DeviceDescriptor>,
    index: HashMap<String, usize>,
}

impl DeviceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device, replacing any previous device with the same id
    /// in place.
    pub fn register(&mut self, device: DeviceDescriptor) {
        match self.index.get(&device.id) {
            Some(&slot) => self.devices[slot] = device,
            None => {
                self.index.insert(device.id.clone(), self.devices.len());
                self.devices.push(device);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&DeviceDescriptor> {
        self.index.get(id).map(|&i| &self.devices[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceDescriptor> {
        self.devices.iter()
    }

    pub fn by_category(
        &self,
        category: DeviceCategory,
    ) -> impl Iterator<Item = &DeviceDescriptor> {
        self.devices.iter().filter(move |d| d.category == category)
    }

    /// Case-insensitive substring match on the device name. An empty term
    /// matches every device.
    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a DeviceDescriptor> + 'a {
        let needle = term.to_lowercase();
        self.devices
            .iter()
            .filter(move |d| d.name.to_lowercase().contains(&needle))
    }
}

impl fmt::Debug for DeviceCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCatalog")
            .field(
                "devices",
                &self.devices.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn q_pair(q: Bit) -> SignalVector {
    SignalVector::new().with("Q", q).with("Q'", q.toggled())
}

fn jk_next(inputs: &SignalVector, state: &SignalVector) -> SignalVector {
    let q = state.level("Q");
    match (inputs.level("J"), inputs.level("K")) {
        (Bit::Low, Bit::Low) => q_pair(q),
        (Bit::Low, Bit::High) => q_pair(Bit::Low),
        (Bit::High, Bit::Low) => q_pair(Bit::High),
        (Bit::High, Bit::High) => q_pair(q.toggled()),
    }
}

const COUNTER_BITS: [&str; 3] = ["Q2", "Q1", "Q0"];

fn counter_word(count: u32) -> SignalVector {
    SignalVector::new()
        .with("Q2", Bit::from(count & 0b100 != 0))
        .with("Q1", Bit::from(count & 0b010 != 0))
        .with("Q0", Bit::from(count & 0b001 != 0))
}

fn jk_kmap() -> KMap {
    KMap::new(
        [
            ["0", "1", "1", "0"],
            ["0", "X", "X", "1"],
            ["1", "X", "X", "0"],
            ["1", "0", "0", "1"],
        ],
        "Q+ = JQ' + K'Q",
    )
}

fn jk_excitation() -> ReferenceTable {
    ReferenceTable::new(["Q", "Q+1", "J", "K"])
        .row(["0", "0", "0", "X"])
        .row(["0", "1", "1", "X"])
        .row(["1", "0", "X", "1"])
        .row(["1", "1", "X", "0"])
}

fn count_table(pairs: &[(&str, &str)]) -> ReferenceTable {
    pairs
        .iter()
        .fold(
            ReferenceTable::new(["Current State (Q2 Q1 Q0)", "Next State"]),
            |t, (cur, next)| t.row([*cur, *next]),
        )
}

fn sr_latch() -> DeviceDescriptor {
    DeviceDescriptor::new(
        "sr-latch",
        "SR Latch (NOR)",
        DeviceCategory::Latch,
        DeviceKind::latch(|inputs, state| {
            match (inputs.level("S"), inputs.level("R")) {
                (Bit::High, Bit::High) => SignalVector::new()
                    .with("Q", Bit::Low)
                    .with("Q'", Bit::Low),
                (Bit::High, Bit::Low) => q_pair(Bit::High),
                (Bit::Low, Bit::High) => q_pair(Bit::Low),
                (Bit::Low, Bit::Low) => q_pair(state.level("Q")),
            }
        }),
    )
    .with_description(
        "A bistable element with Set and Reset inputs. Q=1, Q'=0 is the Set state and \
         Q=0, Q'=1 the Reset state; driving S and R high together is invalid.",
    )
    .with_inputs(["S", "R"])
    .with_outputs(["Q", "Q'"])
    .with_characteristic_table(
        ReferenceTable::new(["S", "R", "Q", "Q'", "Note"])
            .row(["0", "0", "Q", "Q'", "No Change"])
            .row(["0", "1", "0", "1", "Reset"])
            .row(["1", "0", "1", "0", "Set"])
            .row(["1", "1", "0", "0", "Invalid State"]),
    )
    .with_excitation_table(
        ReferenceTable::new(["Q", "Q+1", "S", "R"])
            .row(["0", "0", "0", "X"])
            .row(["0", "1", "1", "0"])
            .row(["1", "0", "0", "1"])
            .row(["1", "1", "X", "0"]),
    )
    .with_equation("Q+ = S + R'Q (when SR=0)")
}

fn d_flip_flop() -> DeviceDescriptor {
    DeviceDescriptor::new(
        "d-flip-flop-pe",
        "D Flip-Flop (Positive Edge)",
        DeviceCategory::FlipFlop,
        DeviceKind::edge_triggered(|inputs, _| q_pair(inputs.level("D"))),
    )
    .with_description(
        "Captures D on the active clock edge and holds it on Q until the next edge.",
    )
    .with_inputs(["D", "CLK"])
    .with_outputs(["Q", "Q'"])
    .with_characteristic_table(
        ReferenceTable::new(["CLK", "D", "Q+1", "Q'+1", "Note"])
            .row(["↑", "0", "0", "1", "Reset"])
            .row(["↑", "1", "1", "0", "Set"])
            .row(["not ↑", "X", "Q", "Q'", "No Change"]),
    )
    .with_excitation_table(
        ReferenceTable::new(["Q", "Q+1", "D"])
            .row(["0", "0", "0"])
            .row(["0", "1", "1"])
            .row(["1", "0", "0"])
            .row(["1", "1", "1"]),
    )
    .with_equation("Q+ = D")
    .with_kmap(KMap::new([["0", "1"]], "Q+ = D"))
}

fn jk_flip_flop() -> DeviceDescriptor {
    DeviceDescriptor::new(
        "jk-flip-flop-pe",
        "JK Flip-Flop (Positive Edge)",
        DeviceCategory::FlipFlop,
        DeviceKind::edge_triggered(jk_next),
    )
    .with_description(
        "The universal flip-flop: J sets, K resets, and J=K=1 toggles Q on each active edge.",
    )
    .with_inputs(["J", "K", "CLK"])
    .with_outputs(["Q", "Q'"])
    .with_characteristic_table(
        ReferenceTable::new(["CLK", "J", "K", "Q+1", "Note"])
            .row(["↑", "0", "0", "Q", "No Change"])
            .row(["↑", "0", "1", "0", "Reset"])
            .row(["↑", "1", "0", "1", "Set"])
            .row(["↑", "1", "1", "Q'", "Toggle"]),
    )
    .with_excitation_table(jk_excitation())
    .with_equation("Q+ = JQ' + K'Q")
    .with_kmap(jk_kmap())
}

fn jk_flip_flop_async() -> DeviceDescriptor {
    DeviceDescriptor::new(
        "jk-flip-flop-async",
        "JK Flip-Flop (Async PRE/CLR)",
        DeviceCategory::FlipFlop,
        DeviceKind::edge_triggered(jk_next),
    )
    .with_description(
        "A JK flip-flop with active-low asynchronous Preset and Clear. PRE forces Q=1 and \
         CLR forces Q=0 regardless of the clock; clocked operation resumes when both are high.",
    )
    .with_inputs(["J", "K", "CLK", "PRE", "CLR"])
    .with_outputs(["Q", "Q'"])
    .with_characteristic_table(
        ReferenceTable::new(["PRE", "CLR", "CLK", "J", "K", "Q+1", "Note"])
            .row(["0", "1", "X", "X", "X", "1", "Async Set (Preset)"])
            .row(["1", "0", "X", "X", "X", "0", "Async Reset (Clear)"])
            .row(["0", "0", "X", "X", "X", "?", "Invalid State"])
            .row(["1", "1", "↑", "0", "0", "Q", "No Change"])
            .row(["1", "1", "↑", "0", "1", "0", "Reset"])
            .row(["1", "1", "↑", "1", "0", "1", "Set"])
            .row(["1", "1", "↑", "1", "1", "Q'", "Toggle"]),
    )
    .with_excitation_table(jk_excitation())
    .with_equation("Q+ = JQ' + K'Q (when PRE=1, CLR=1)")
    .with_kmap(jk_kmap())
}

fn t_flip_flop() -> DeviceDescriptor {
    DeviceDescriptor::new(
        "t-flip-flop-pe",
        "T Flip-Flop (Positive Edge)",
        DeviceCategory::FlipFlop,
        DeviceKind::edge_triggered(|inputs, state| {
            let q = state.level("Q");
            match inputs.level("T") {
                Bit::High => q_pair(q.toggled()),
                Bit::Low => q_pair(q),
            }
        }),
    )
    .with_description("Toggles Q on each active edge while T is high; holds otherwise.")
    .with_inputs(["T", "CLK"])
    .with_outputs(["Q", "Q'"])
    .with_characteristic_table(
        ReferenceTable::new(["CLK", "T", "Q+1", "Note"])
            .row(["↑", "0", "Q", "No Change"])
            .row(["↑", "1", "Q'", "Toggle"]),
    )
    .with_excitation_table(
        ReferenceTable::new(["Q", "Q+1", "T"])
            .row(["0", "0", "0"])
            .row(["0", "1", "1"])
            .row(["1", "0", "1"])
            .row(["1", "1", "0"]),
    )
    .with_equation("Q+ = T ⊕ Q = TQ' + T'Q")
    .with_kmap(KMap::new([["0", "1"], ["1", "0"]], "Q+ = T ⊕ Q"))
}

fn up_counter() -> DeviceDescriptor {
    DeviceDescriptor::new(
        "up-counter-jk",
        "3-Bit Async Up Counter",
        DeviceCategory::Counter,
        DeviceKind::edge_triggered(|_, state| counter_word((state.to_word(&COUNTER_BITS) + 1) % 8)),
    )
    .with_description(
        "A ripple counter of three toggling JK stages; each stage's Q clocks the next. \
         Counts 000 through 111 and wraps.",
    )
    .with_inputs(["CLK"])
    .with_outputs(COUNTER_BITS)
    .with_characteristic_table(count_table(&[
        ("000", "001"),
        ("001", "010"),
        ("010", "011"),
        ("011", "100"),
        ("100", "101"),
        ("101", "110"),
        ("110", "111"),
        ("111", "000"),
    ]))
    .with_equation("Counts up on each clock cycle.")
}

fn down_counter() -> DeviceDescriptor {
    DeviceDescriptor::new(
        "down-counter-jk",
        "3-Bit Async Down Counter",
        DeviceCategory::Counter,
        DeviceKind::edge_triggered(|_, state| counter_word((state.to_word(&COUNTER_BITS) + 7) % 8)),
    )
    .with_description(
        "A ripple counter whose stages are clocked by the previous stage's Q'. \
         Counts 111 down to 000 and wraps.",
    )
    .with_inputs(["CLK"])
    .with_outputs(COUNTER_BITS)
    .with_characteristic_table(count_table(&[
        ("111", "110"),
        ("110", "101"),
        ("101", "100"),
        ("100", "011"),
        ("011", "010"),
        ("010", "001"),
        ("001", "000"),
        ("000", "111"),
    ]))
    .with_equation("Counts down on each clock cycle.")
}

/// Creates the catalog of built-in devices.
///
/// Includes, in display order:
/// - `sr-latch`
/// - `d-flip-flop-pe`
/// - `jk-flip-flop-pe`
/// - `jk-flip-flop-async`
/// - `t-flip-flop-pe`
/// - `up-counter-jk`
/// - `down-counter-jk`
pub fn create_default_catalog() -> DeviceCatalog {
    let mut catalog = DeviceCatalog::new();
    for device in [
        sr_latch(),
        d_flip_flop(),
        jk_flip_flop(),
        jk_flip_flop_async(),
        t_flip_flop(),
        up_counter(),
        down_counter(),
    ] {
        catalog.register(device);
    }
    catalog
}
