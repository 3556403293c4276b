use crate::models::Slot;

/// Default check-in slot for a wall-clock hour.
pub fn suggested_slot(hour: u32) -> Slot {
    match hour {
        4..=11 => Slot::Morning,
        12..=18 => Slot::Evening,
        _ => Slot::Night,
    }
}

/// Pre-slot day period, kept for display of rows that predate slots.
pub fn day_period(hour: u32) -> &'static str {
    match hour {
        0..=11 => "morning",
        12..=17 => "afternoon",
        _ => "evening",
    }
}
