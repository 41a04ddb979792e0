//! Named signal assignments.
//!
//! A `SignalVector` maps signal names to levels. The same type carries one
//! cycle of the input tape (an input vector) and the latched outputs of a
//! device (a state vector).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::Bit;

/// A mapping from signal name to binary level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalVector {
    values: BTreeMap<String, Bit>,
}

impl SignalVector {
    /// Creates an empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a vector with every name set to `level`.
    pub fn filled<I, S>(names: I, level: Bit) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: names.into_iter().map(|n| (n.into(), level)).collect(),
        }
    }

    /// Creates an all-low vector over `names`.
    pub fn zeroed<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::filled(names, Bit::Low)
    }

    /// Builder-style setter.
    pub fn with(mut self, name: impl Into<String>, level: Bit) -> Self {
        self.values.insert(name.into(), level);
        self
    }

    /// Returns the level of `name`, if assigned.
    pub fn get(&self, name: &str) -> Option<Bit> {
        self.values.get(name).copied()
    }

    /// Returns the level of `name`, or `Low` when unassigned.
    pub fn level(&self, name: &str) -> Bit {
        self.get(name).unwrap_or_default()
    }

    /// Assigns `level` to `name`, returning the previous level.
    pub fn set(&mut self, name: impl Into<String>, level: Bit) -> Option<Bit> {
        self.values.insert(name.into(), level)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(name, level)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Bit)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Overwrites the entries of `self` with those of `partial` whose names
    /// are already present. Names unknown to `self` are skipped.
    pub fn merge_known(&mut self, partial: &SignalVector) {
        for (name, level) in partial.iter() {
            if let Some(slot) = self.values.get_mut(name) {
                *slot = level;
            }
        }
    }

    /// Returns the first name in `names` that has no assignment.
    pub fn first_missing<'a>(&self, names: &'a [String]) -> Option<&'a str> {
        names
            .iter()
            .find(|n| !self.values.contains_key(n.as_str()))
            .map(|n| n.as_str())
    }

    /// Copies the assignments for `names` into a new vector, skipping names
    /// without a value.
    pub fn project(&self, names: &[String]) -> SignalVector {
        let values = names
            .iter()
            .filter_map(|n| self.values.get(n).map(|v| (n.clone(), *v)))
            .collect();
        SignalVector { values }
    }

    /// Packs the levels of `names` into an integer, first name most
    /// significant. Missing names count as low.
    pub fn to_word(&self, names: &[&str]) -> u32 {
        names
            .iter()
            .fold(0, |acc, n| (acc << 1) | u32::from(u8::from(self.level(n))))
    }
}

impl<S: Into<String>> FromIterator<(S, Bit)> for SignalVector {
    fn from_iter<T: IntoIterator<Item = (S, Bit)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl fmt::Display for SignalVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
