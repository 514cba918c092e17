//! # Output Slots
//!
//! Fixed-shape result buffer of a battle. Positions are part of the
//! contract with the renderer:
//!
//! ```text
//! [0] v1 pitch   [1] v1 financials   [2] v1 engineering
//! [3] v2 pitch   [4] v2 financials   [5] v2 engineering
//! [6] verdict    [7] error
//! ```

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::SlotError;

pub const SLOT_COUNT: usize = 8;

pub const V1_PITCH: usize = 0;
pub const V1_FINANCIALS: usize = 1;
pub const V1_ENGINEERING: usize = 2;
pub const V2_PITCH: usize = 3;
pub const V2_FINANCIALS: usize = 4;
pub const V2_ENGINEERING: usize = 5;
pub const VERDICT: usize = 6;
pub const ERROR: usize = 7;

/// Tab labels of the renderer, indexed by slot
pub const SLOT_LABELS: [&str; SLOT_COUNT] = [
    "Variation 1 · Pitch",
    "Variation 1 · Financials",
    "Variation 1 · Tech",
    "Variation 2 · Pitch",
    "Variation 2 · Financials",
    "Variation 2 · Tech",
    "Jury Verdict",
    "Errors",
];

/// Status shown next to the run button once a run ends with an error
pub const ERROR_STATUS: &str = "❌ See Errors tab ❌";

/// Mutable slot buffer, owned by one coordinator run
#[derive(Debug, Clone, Default)]
pub struct OutputSlots {
    values: [String; SLOT_COUNT],
}

impl OutputSlots {
    /// Eight empty slots
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite one slot
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> Result<(), SlotError> {
        let slot = self
            .values
            .get_mut(index)
            .ok_or(SlotError::OutOfRange { index })?;
        *slot = value.into();
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Empty every slot, the error slot included
    pub fn clear(&mut self) {
        self.values = Default::default();
    }

    /// Immutable copy of all eight values, in order
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.values.clone())
    }
}

/// Full state of all eight slots at one point of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot([String; SLOT_COUNT]);

impl Snapshot {
    pub fn slots(&self) -> &[String; SLOT_COUNT] {
        &self.0
    }

    pub fn into_slots(self) -> [String; SLOT_COUNT] {
        self.0
    }

    pub fn verdict(&self) -> &str {
        &self.0[VERDICT]
    }

    pub fn error(&self) -> &str {
        &self.0[ERROR]
    }

    /// Whether the run ended in either failure branch
    pub fn is_failed(&self) -> bool {
        !self.error().trim().is_empty()
    }

    /// Short status for the renderer; empty unless the run failed
    pub fn status_line(&self) -> &'static str {
        if self.is_failed() {
            ERROR_STATUS
        } else {
            ""
        }
    }

    /// Indices whose value differs from `previous`
    pub fn changed_since(&self, previous: &Snapshot) -> Vec<usize> {
        (0..SLOT_COUNT)
            .filter(|&index| self.0[index] != previous.0[index])
            .collect()
    }
}

impl Index<usize> for Snapshot {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_empty() {
        let snapshot = OutputSlots::new().snapshot();
        assert!(snapshot.slots().iter().all(String::is_empty));
        assert_eq!(snapshot.status_line(), "");
    }

    #[test]
    fn test_set_and_snapshot() {
        let mut slots = OutputSlots::new();
        slots.set(V2_FINANCIALS, "burn rate").unwrap();

        let snapshot = slots.snapshot();
        assert_eq!(&snapshot[V2_FINANCIALS], "burn rate");
        assert_eq!(slots.get(V2_FINANCIALS), Some("burn rate"));

        // Snapshots are copies
        slots.set(V2_FINANCIALS, "runway").unwrap();
        assert_eq!(&snapshot[V2_FINANCIALS], "burn rate");
    }

    #[test]
    fn test_out_of_range_write() {
        let mut slots = OutputSlots::new();
        assert_eq!(
            slots.set(SLOT_COUNT, "x"),
            Err(SlotError::OutOfRange { index: 8 })
        );
        assert_eq!(slots.get(SLOT_COUNT), None);
    }

    #[test]
    fn test_clear() {
        let mut slots = OutputSlots::new();
        slots.set(V1_PITCH, "pitch").unwrap();
        slots.set(ERROR, "boom").unwrap();
        slots.clear();
        assert_eq!(slots.snapshot(), Snapshot::default());
    }

    #[test]
    fn test_status_line() {
        let mut slots = OutputSlots::new();
        slots.set(ERROR, "  ").unwrap();
        assert!(!slots.snapshot().is_failed());

        slots.set(ERROR, "overloaded").unwrap();
        assert_eq!(slots.snapshot().status_line(), ERROR_STATUS);
    }

    #[test]
    fn test_changed_since() {
        let mut slots = OutputSlots::new();
        let before = slots.snapshot();
        slots.set(V1_PITCH, "a").unwrap();
        slots.set(VERDICT, "b").unwrap();
        assert_eq!(slots.snapshot().changed_since(&before), vec![V1_PITCH, VERDICT]);
    }

    #[test]
    fn test_snapshot_serializes_as_array() {
        let mut slots = OutputSlots::new();
        slots.set(V1_PITCH, "pitch").unwrap();
        let json = serde_json::to_value(slots.snapshot()).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(SLOT_COUNT));
        assert_eq!(json[0], "pitch");
    }
}
