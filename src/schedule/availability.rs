// src/schedule/availability.rs

use std::collections::HashSet;

/// Decide whether a run of `required` consecutive slots starting at
/// `candidate_start` can be booked against the company's ordered `all_slots`
/// and the day's `blocked` set.
///
/// Rejects when the start label is not a configured opening-hours slot, when
/// the run would extend past the end of the day (no wrapping, even if a later
/// label repeats elsewhere in the sequence), or when any slot in the run is
/// already blocked. Pure; safe to call once per candidate when rendering a
/// grid.
pub fn is_slot_sequence_available(
    candidate_start: &str,
    required: usize,
    all_slots: &[String],
    blocked: &HashSet<String>,
) -> bool {
    let Some(start_index) = all_slots.iter().position(|s| s == candidate_start) else {
        return false;
    };
    if start_index + required > all_slots.len() {
        return false;
    }

    all_slots[start_index..start_index + required]
        .iter()
        .all(|slot| !blocked.contains(slot))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn blocked(labels: &[&str]) -> HashSet<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn accepts_a_free_contiguous_run() {
        let all = slots(&["09:00", "09:30", "10:00"]);
        assert!(is_slot_sequence_available("09:00", 2, &all, &HashSet::new()));
    }

    #[test]
    fn rejects_start_not_in_opening_hours() {
        let all = slots(&["09:00", "09:30"]);
        assert!(!is_slot_sequence_available("08:00", 1, &all, &HashSet::new()));
    }

    #[test]
    fn rejects_run_past_closing_time() {
        let all = slots(&["09:00", "09:30", "10:00"]);
        // last valid start for 3 slots is 09:00
        assert!(is_slot_sequence_available("09:00", 3, &all, &HashSet::new()));
        assert!(!is_slot_sequence_available("09:30", 3, &all, &HashSet::new()));
    }

    #[test]
    fn rejects_collision_anywhere_in_the_run() {
        let all = slots(&["09:00", "09:30", "10:00"]);
        // existing 60-minute booking at 09:00 blocks 09:00 and 09:30
        let taken = blocked(&["09:00", "09:30"]);
        assert!(!is_slot_sequence_available("09:30", 1, &all, &taken));
        assert!(is_slot_sequence_available("10:00", 1, &all, &taken));
        // a run whose tail hits the block is rejected even with a free start
        let tail_block = blocked(&["09:30"]);
        assert!(!is_slot_sequence_available("09:00", 2, &all, &tail_block));
    }

    #[test]
    fn occupancy_feeds_the_validator() {
        use crate::schedule::occupancy::{AppointmentSpan, DayOccupancy};
        use uuid::Uuid;

        let all = slots(&["09:00", "09:30", "10:00"]);
        let occ = DayOccupancy::build(
            &all,
            &[AppointmentSpan {
                appointment_id: Uuid::new_v4(),
                start: "09:00".into(),
                duration_min: 60,
            }],
        );

        // a 30-minute request lands on the booking's second slot
        assert!(!is_slot_sequence_available("09:30", 1, &all, occ.blocked_set()));
        assert!(is_slot_sequence_available("10:00", 1, &all, occ.blocked_set()));
    }

    #[test]
    fn empty_blocked_set_only_bounds_apply() {
        let all = slots(&["07:00"]);
        assert!(is_slot_sequence_available("07:00", 1, &all, &HashSet::new()));
        assert!(!is_slot_sequence_available("07:00", 2, &all, &HashSet::new()));
    }
}
