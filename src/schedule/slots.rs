// src/schedule/slots.rs

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// First bookable hour of the day.
pub const OPENING_HOUR: u32 = 7;
/// Exclusive end hour; the last generated label is 23:30.
pub const CLOSING_HOUR: u32 = 24;
/// Fixed slot granularity. Other step sizes are unsupported.
pub const SLOT_MINUTES: u32 = 30;

/// Generate the canonical slot universe: every "HH:MM" label from 07:00 up
/// to and including 23:30, strictly increasing, 30 minutes apart.
///
/// A company's configured `times` is always a (possibly non-contiguous)
/// subset of this sequence, selected in the profile form.
pub fn slot_universe() -> Vec<String> {
    let mut labels = Vec::with_capacity(((CLOSING_HOUR - OPENING_HOUR) * 2) as usize);
    for hour in OPENING_HOUR..CLOSING_HOUR {
        for half in 0..2 {
            labels.push(format!("{:02}:{:02}", hour, half * SLOT_MINUTES));
        }
    }
    labels
}

/// Number of contiguous 30-minute slots a service occupies:
/// `ceil(duration_min / 30)`. Durations are validated positive upstream;
/// any positive duration maps to at least one slot.
pub fn slots_required(duration_min: i32) -> usize {
    ((duration_min + SLOT_MINUTES as i32 - 1) / SLOT_MINUTES as i32).max(1) as usize
}

/// Parse a "HH:MM" slot label. Returns None for anything malformed.
pub fn parse_slot_label(label: &str) -> Option<NaiveTime> {
    let (h, m) = label.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }
    NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0)
}

/// True when `date` is the same calendar day as `now`.
pub fn is_today(date: NaiveDate, now: NaiveDateTime) -> bool {
    date == now.date()
}

/// True when the slot's wall-clock start is already past. Only meaningful
/// on the current calendar day; callers must gate on [`is_today`] first.
/// A slot starting exactly at the current minute counts as past.
pub fn slot_in_past(label: &str, now: NaiveTime) -> bool {
    match parse_slot_label(label) {
        Some(slot) => {
            slot.hour() < now.hour()
                || (slot.hour() == now.hour() && slot.minute() <= now.minute())
        }
        // unparseable labels never come out of the generator; treat as past
        // so they can never be booked
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn universe_runs_from_open_to_last_half_hour() {
        let slots = slot_universe();
        assert_eq!(slots.len(), 34);
        assert_eq!(slots.first().map(String::as_str), Some("07:00"));
        assert_eq!(slots.last().map(String::as_str), Some("23:30"));
    }

    #[test]
    fn universe_is_strictly_increasing_half_hours() {
        let slots = slot_universe();
        let parsed: Vec<NaiveTime> = slots
            .iter()
            .map(|s| parse_slot_label(s).expect("generated label must parse"))
            .collect();
        for pair in parsed.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_minutes(), 30);
        }
    }

    #[test]
    fn slots_required_rounds_up() {
        assert_eq!(slots_required(30), 1);
        assert_eq!(slots_required(45), 2);
        assert_eq!(slots_required(60), 2);
        assert_eq!(slots_required(61), 3);
        assert_eq!(slots_required(90), 3);
        assert_eq!(slots_required(1), 1);
    }

    #[test]
    fn parse_rejects_malformed_labels() {
        assert!(parse_slot_label("7:00").is_none());
        assert!(parse_slot_label("0700").is_none());
        assert!(parse_slot_label("25:00").is_none());
        assert!(parse_slot_label("aa:bb").is_none());
        assert_eq!(
            parse_slot_label("09:30"),
            NaiveTime::from_hms_opt(9, 30, 0)
        );
    }

    #[test]
    fn slot_in_past_compares_wall_clock() {
        let now = NaiveTime::from_hms_opt(15, 10, 0).unwrap();
        assert!(slot_in_past("14:30", now));
        assert!(slot_in_past("15:00", now));
        assert!(!slot_in_past("15:30", now));
        // exact current minute counts as elapsed
        let on_the_dot = NaiveTime::from_hms_opt(15, 0, 0).unwrap();
        assert!(slot_in_past("15:00", on_the_dot));
    }
}
