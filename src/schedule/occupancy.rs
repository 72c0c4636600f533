// src/schedule/occupancy.rs

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::slots::slots_required;

/// One confirmed appointment as the occupancy index sees it: its id, its
/// start label and the duration of the booked service. Everything else
/// (client, price, ...) is irrelevant to slot math.
#[derive(Debug, Clone)]
pub struct AppointmentSpan {
    pub appointment_id: Uuid,
    pub start: String,
    pub duration_min: i32,
}

/// Per-(company, day) occupancy, recomputed from appointment rows on every
/// read. Never persisted; the appointment table stays the single source of
/// truth.
#[derive(Debug, Default)]
pub struct DayOccupancy {
    slot_map: HashMap<String, Uuid>,
    blocked: HashSet<String>,
}

impl DayOccupancy {
    /// Expand each appointment into the run of labels it occupies.
    ///
    /// The start index is located by position in the company's current
    /// `times`. Two tolerances for opening hours mutated after booking:
    /// an appointment whose start label is no longer present is skipped
    /// entirely, and a run extending past the end of the day is truncated
    /// to the in-range tail.
    pub fn build(times: &[String], appointments: &[AppointmentSpan]) -> Self {
        let mut occ = DayOccupancy::default();

        for appt in appointments {
            let Some(start_index) = times.iter().position(|t| t == &appt.start) else {
                continue;
            };
            let required = slots_required(appt.duration_min);
            let end = (start_index + required).min(times.len());

            for label in &times[start_index..end] {
                occ.slot_map.insert(label.clone(), appt.appointment_id);
                occ.blocked.insert(label.clone());
            }
        }

        occ
    }

    pub fn is_blocked(&self, label: &str) -> bool {
        self.blocked.contains(label)
    }

    pub fn occupant(&self, label: &str) -> Option<Uuid> {
        self.slot_map.get(label).copied()
    }

    pub fn blocked_set(&self) -> &HashSet<String> {
        &self.blocked
    }

    /// Blocked labels in the company's slot order, the shape the public
    /// get-appointments endpoint returns.
    pub fn blocked_labels(&self, times: &[String]) -> Vec<String> {
        times
            .iter()
            .filter(|t| self.is_blocked(t.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn span(start: &str, duration_min: i32) -> AppointmentSpan {
        AppointmentSpan {
            appointment_id: Uuid::new_v4(),
            start: start.to_string(),
            duration_min,
        }
    }

    #[test]
    fn sixty_minute_service_occupies_two_slots() {
        let times = times(&["14:30", "15:00", "15:30", "16:00"]);
        let occ = DayOccupancy::build(&times, &[span("15:00", 60)]);

        assert_eq!(occ.blocked_labels(&times), vec!["15:00", "15:30"]);
        assert!(!occ.is_blocked("14:30"));
        assert!(!occ.is_blocked("16:00"));
    }

    #[test]
    fn slot_map_points_back_at_the_occupying_appointment() {
        let times = times(&["09:00", "09:30", "10:00"]);
        let appt = span("09:00", 60);
        let occ = DayOccupancy::build(&times, &[appt.clone()]);

        assert_eq!(occ.occupant("09:00"), Some(appt.appointment_id));
        assert_eq!(occ.occupant("09:30"), Some(appt.appointment_id));
        assert_eq!(occ.occupant("10:00"), None);
    }

    #[test]
    fn run_past_closing_is_truncated_not_an_error() {
        let times = times(&["23:00", "23:30"]);
        // 90 minutes needs 3 slots but only 2 remain in the day
        let occ = DayOccupancy::build(&times, &[span("23:00", 90)]);
        assert_eq!(occ.blocked_labels(&times), vec!["23:00", "23:30"]);
    }

    #[test]
    fn appointment_with_stale_start_label_is_skipped() {
        // company removed 08:00 from its hours after this was booked
        let times = times(&["09:00", "09:30"]);
        let occ = DayOccupancy::build(&times, &[span("08:00", 60)]);
        assert!(occ.blocked_set().is_empty());
    }

    #[test]
    fn build_is_idempotent_for_the_same_input() {
        let times = times(&["09:00", "09:30", "10:00", "10:30"]);
        let appts = vec![span("09:00", 60), span("10:30", 30)];

        let a = DayOccupancy::build(&times, &appts);
        let b = DayOccupancy::build(&times, &appts);
        assert_eq!(a.blocked_labels(&times), b.blocked_labels(&times));
    }
}
