use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Fixed enumeration orders; every tie-break walks one of these arrays.
pub const MOODS: [Mood; 3] = [Mood::Happy, Mood::Neutral, Mood::Sad];
pub const SLOTS: [Slot; 3] = [Slot::Morning, Slot::Evening, Slot::Night];
pub const ENERGIES: [Energy; 3] = [Energy::High, Energy::Medium, Energy::Low];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Neutral,
    Sad,
}

impl Mood {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "happy" => Some(Mood::Happy),
            "neutral" => Some(Mood::Neutral),
            "sad" => Some(Mood::Sad),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Neutral => "neutral",
            Mood::Sad => "sad",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Morning,
    Evening,
    Night,
}

impl Slot {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "morning" => Some(Slot::Morning),
            "evening" => Some(Slot::Evening),
            "night" => Some(Slot::Night),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Morning => "morning",
            Slot::Evening => "evening",
            Slot::Night => "night",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Energy {
    High,
    Medium,
    Low,
}

impl Energy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "high" => Some(Energy::High),
            "medium" => Some(Energy::Medium),
            "low" => Some(Energy::Low),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Energy::High => "high",
            Energy::Medium => "medium",
            Energy::Low => "low",
        }
    }
}

/// A check-in row as stored: mood/slot/energy stay free text so unrecognized
/// values are tolerated at aggregation time instead of rejected at the edge.
#[derive(Debug, Clone)]
pub struct CheckInRecord {
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub checkin_date: NaiveDate,
    pub slot: Option<String>,
    pub time_of_day: Option<String>,
    pub mood: Option<String>,
    pub energy: Option<String>,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
}

impl CheckInRecord {
    pub fn mood_value(&self) -> Option<Mood> {
        self.mood.as_deref().and_then(Mood::parse)
    }

    /// `time_of_day` is the pre-slot column name; older rows only carry it.
    pub fn slot_value(&self) -> Option<Slot> {
        let raw = self
            .slot
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .or(self.time_of_day.as_deref())?;
        Slot::parse(raw)
    }

    pub fn energy_value(&self) -> Option<Energy> {
        self.energy.as_deref().and_then(Energy::parse)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MoodCounts {
    pub happy: usize,
    pub neutral: usize,
    pub sad: usize,
}

impl MoodCounts {
    pub fn get(self, mood: Mood) -> usize {
        match mood {
            Mood::Happy => self.happy,
            Mood::Neutral => self.neutral,
            Mood::Sad => self.sad,
        }
    }

    pub fn bump(&mut self, mood: Mood) {
        match mood {
            Mood::Happy => self.happy += 1,
            Mood::Neutral => self.neutral += 1,
            Mood::Sad => self.sad += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlotCounts {
    pub morning: usize,
    pub evening: usize,
    pub night: usize,
}

impl SlotCounts {
    pub fn get(self, slot: Slot) -> usize {
        match slot {
            Slot::Morning => self.morning,
            Slot::Evening => self.evening,
            Slot::Night => self.night,
        }
    }

    pub fn bump(&mut self, slot: Slot) {
        match slot {
            Slot::Morning => self.morning += 1,
            Slot::Evening => self.evening += 1,
            Slot::Night => self.night += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnergyCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl EnergyCounts {
    pub fn get(self, energy: Energy) -> usize {
        match energy {
            Energy::High => self.high,
            Energy::Medium => self.medium,
            Energy::Low => self.low,
        }
    }

    pub fn bump(&mut self, energy: Energy) {
        match energy {
            Energy::High => self.high += 1,
            Energy::Medium => self.medium += 1,
            Energy::Low => self.low += 1,
        }
    }
}

/// Derived per-week aggregate; never persisted, cheap to recompute.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeekStats {
    pub total_checkins: usize,
    pub mood_counts: MoodCounts,
    pub dominant_mood: Option<Mood>,
    pub top_symptoms: Vec<String>,
    pub slot_counts: SlotCounts,
    pub challenging_slot: Option<Slot>,
    pub energy_counts: EnergyCounts,
    pub dominant_energy: Option<Energy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupportSuggestion {
    pub topic: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct AppointmentRecord {
    pub id: Uuid,
    pub title: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Trimester from due date, assuming a 280-day term.
pub fn trimester_on(due_date: NaiveDate, today: NaiveDate) -> u8 {
    let days_left = (due_date - today).num_days();
    let week = ((280 - days_left).max(0) / 7).min(40);
    match week {
        0..=12 => 1,
        13..=27 => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record_with(slot: Option<&str>, time_of_day: Option<&str>) -> CheckInRecord {
        CheckInRecord {
            user_id: Uuid::new_v4(),
            user_name: "Maya Chen".to_string(),
            user_email: "maya.chen@example.com".to_string(),
            checkin_date: NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
            slot: slot.map(str::to_string),
            time_of_day: time_of_day.map(str::to_string),
            mood: Some("happy".to_string()),
            energy: None,
            symptoms: None,
            notes: None,
        }
    }

    #[test]
    fn parses_are_tolerant() {
        assert_eq!(Mood::parse(" Happy "), Some(Mood::Happy));
        assert_eq!(Mood::parse("ecstatic"), None);
        assert_eq!(Slot::parse("NIGHT"), Some(Slot::Night));
        assert_eq!(Slot::parse("afternoon"), None);
        assert_eq!(Energy::parse("low"), Some(Energy::Low));
        assert_eq!(Energy::parse(""), None);
    }

    #[test]
    fn slot_falls_back_to_legacy_column() {
        assert_eq!(
            record_with(None, Some("night")).slot_value(),
            Some(Slot::Night)
        );
        assert_eq!(
            record_with(Some("  "), Some("morning")).slot_value(),
            Some(Slot::Morning)
        );
        assert_eq!(
            record_with(Some("evening"), Some("morning")).slot_value(),
            Some(Slot::Evening)
        );
        assert_eq!(record_with(None, Some("afternoon")).slot_value(), None);
    }

    #[test]
    fn trimester_tracks_gestational_week() {
        let due = NaiveDate::from_ymd_opt(2026, 11, 20).unwrap();
        assert_eq!(trimester_on(due, due - Duration::days(280)), 1);
        assert_eq!(trimester_on(due, due - Duration::days(280 - 13 * 7)), 2);
        assert_eq!(trimester_on(due, due - Duration::days(280 - 28 * 7)), 3);
        assert_eq!(trimester_on(due, due + Duration::days(5)), 3);
    }
}
