//! # Task Result Router
//!
//! Slots incoming task outputs into the [`OutputSlots`] buffer.
//!
//! Variation pipelines use an offset (0 for variation 1, 3 for variation 2);
//! the jury pipeline writes the verdict slot directly. Unknown task names
//! are ignored so new stages can be added to a crew without breaking the
//! renderer contract.

use crate::error::SlotError;
use crate::swarm::events::TaskOutput;
use crate::swarm::pipeline::{ENGINEERING_TASK, EVALUATION_TASK, FINANCIAL_TASK, PITCH_TASK};
use crate::swarm::slots::{OutputSlots, VERDICT};

/// Slot index for a variation task, or `None` for unmodeled tasks
pub fn slot_for_task(task_name: &str, offset: usize) -> Option<usize> {
    match task_name {
        PITCH_TASK => Some(offset),
        FINANCIAL_TASK => Some(offset + 1),
        ENGINEERING_TASK => Some(offset + 2),
        _ => None,
    }
}

/// Write `raw` into the slot mapped from `task_name`.
///
/// Returns the slot written, if any.
pub fn route(
    slots: &mut OutputSlots,
    task_name: &str,
    raw: &str,
    offset: usize,
) -> Result<Option<usize>, SlotError> {
    match slot_for_task(task_name, offset) {
        Some(index) => {
            slots.set(index, raw)?;
            Ok(Some(index))
        }
        None => Ok(None),
    }
}

/// Route one variation task output. Unnamed outputs are skipped.
pub fn route_task_output(
    slots: &mut OutputSlots,
    output: &TaskOutput,
    offset: usize,
) -> Result<Option<usize>, SlotError> {
    match output.name.as_deref() {
        Some(name) => route(slots, name, &output.raw, offset),
        None => Ok(None),
    }
}

/// Route one jury output: `evaluation_task` goes to the verdict slot.
pub fn route_evaluation_output(
    slots: &mut OutputSlots,
    output: &TaskOutput,
) -> Result<Option<usize>, SlotError> {
    match output.name.as_deref() {
        Some(EVALUATION_TASK) => {
            slots.set(VERDICT, output.raw.as_str())?;
            Ok(Some(VERDICT))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swarm::slots::{Snapshot, V1_PITCH, V2_ENGINEERING, V2_FINANCIALS};

    #[test]
    fn test_slot_mapping() {
        assert_eq!(slot_for_task("pitch_task", 0), Some(V1_PITCH));
        assert_eq!(slot_for_task("financial_task", 3), Some(V2_FINANCIALS));
        assert_eq!(slot_for_task("engineering_task", 3), Some(V2_ENGINEERING));
        assert_eq!(slot_for_task("marketing_task", 0), None);
        assert_eq!(slot_for_task("evaluation_task", 0), None);
    }

    #[test]
    fn test_route_writes_slot() {
        let mut slots = OutputSlots::new();
        let written = route(&mut slots, "financial_task", "unit economics", 3).unwrap();
        assert_eq!(written, Some(V2_FINANCIALS));
        assert_eq!(slots.get(V2_FINANCIALS), Some("unit economics"));
    }

    #[test]
    fn test_unknown_task_leaves_slots_untouched() {
        let mut slots = OutputSlots::new();
        assert_eq!(route(&mut slots, "legal_task", "terms", 0).unwrap(), None);
        assert_eq!(slots.snapshot(), Snapshot::default());
    }

    #[test]
    fn test_unnamed_output_is_skipped() {
        let mut slots = OutputSlots::new();
        let output = TaskOutput {
            name: None,
            raw: "orphan".to_string(),
            agent: String::new(),
        };
        assert_eq!(route_task_output(&mut slots, &output, 0).unwrap(), None);
        assert_eq!(slots.snapshot(), Snapshot::default());
    }

    #[test]
    fn test_offset_past_buffer_is_a_defect() {
        let mut slots = OutputSlots::new();
        let result = route(&mut slots, "engineering_task", "x", 6);
        assert_eq!(result, Err(SlotError::OutOfRange { index: 8 }));
    }

    #[test]
    fn test_evaluation_routing() {
        let mut slots = OutputSlots::new();
        let verdict = TaskOutput::named("evaluation_task", "Variation 2 wins");
        assert_eq!(
            route_evaluation_output(&mut slots, &verdict).unwrap(),
            Some(VERDICT)
        );
        assert_eq!(slots.snapshot().verdict(), "Variation 2 wins");

        let stray = TaskOutput::named("pitch_task", "not a verdict");
        assert_eq!(route_evaluation_output(&mut slots, &stray).unwrap(), None);
        assert_eq!(slots.get(V1_PITCH), Some(""));
    }
}
