use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};

use crate::models::Slot;

/// Default local reminder time for each check-in slot.
pub fn default_reminder_time(slot: Slot) -> NaiveTime {
    match slot {
        Slot::Morning => NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        Slot::Evening => NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        Slot::Night => NaiveTime::from_hms_opt(20, 30, 0).unwrap(),
    }
}

/// Next occurrence of the slot's reminder time strictly after `now`.
pub fn next_slot_reminder(slot: Slot, now: NaiveDateTime) -> NaiveDateTime {
    let candidate = now.date().and_time(default_reminder_time(slot));
    if candidate > now {
        candidate
    } else {
        candidate + Duration::days(1)
    }
}

/// Appointment reminders fire 24 hours ahead; None once the lead has passed.
pub fn appointment_reminder(
    starts_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let fire_at = starts_at - Duration::hours(24);
    (fire_at > now).then_some(fire_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn reminder_later_today_when_still_ahead() {
        let next = next_slot_reminder(Slot::Evening, at(10, 0));
        assert_eq!(next, at(16, 0));
    }

    #[test]
    fn reminder_rolls_to_tomorrow_once_passed() {
        let next = next_slot_reminder(Slot::Morning, at(9, 0));
        assert_eq!(next, at(9, 0) + Duration::days(1));

        let night = next_slot_reminder(Slot::Night, at(23, 45));
        assert_eq!(night, at(20, 30) + Duration::days(1));
    }

    #[test]
    fn appointment_reminder_needs_remaining_lead() {
        let starts_at = "2026-08-10T14:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let early = "2026-08-08T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let late = "2026-08-10T02:00:00Z".parse::<DateTime<Utc>>().unwrap();

        assert_eq!(
            appointment_reminder(starts_at, early),
            Some(starts_at - Duration::hours(24))
        );
        assert_eq!(appointment_reminder(starts_at, late), None);
    }
}
