use std::fmt::Write;

use chrono::NaiveDate;

use crate::insights;
use crate::models::{CheckInRecord, ENERGIES, MOODS, SLOTS};

pub fn build_report(
    display_name: &str,
    window_start: NaiveDate,
    as_of: NaiveDate,
    records: &[CheckInRecord],
    trimester: u8,
    has_upcoming_appointment: bool,
) -> String {
    let stats = insights::aggregate_week(records);
    let suggestions = insights::support_suggestions(&stats, trimester, has_upcoming_appointment);

    let mut output = String::new();

    let _ = writeln!(output, "# Ivybloom Weekly Recap");
    let _ = writeln!(
        output,
        "Generated for {} (check-ins {} to {})",
        display_name, window_start, as_of
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Check-ins");

    if stats.total_checkins == 0 {
        let _ = writeln!(output, "No check-ins recorded for this window.");
    } else {
        let _ = writeln!(output, "{} total.", stats.total_checkins);
        for mood in MOODS {
            let _ = writeln!(output, "- {}: {}", mood.label(), stats.mood_counts.get(mood));
        }
        for slot in SLOTS {
            let _ = writeln!(output, "- {}: {}", slot.label(), stats.slot_counts.get(slot));
        }
        if let Some(slot) = stats.challenging_slot {
            let _ = writeln!(output, "Toughest slot: {}.", slot.label());
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Symptoms");

    if stats.top_symptoms.is_empty() {
        let _ = writeln!(output, "No symptoms logged for this window.");
    } else {
        for symptom in stats.top_symptoms.iter() {
            let _ = writeln!(output, "- {symptom}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Energy");

    match stats.dominant_energy {
        None => {
            let _ = writeln!(output, "No energy data logged for this window.");
        }
        Some(dominant) => {
            for energy in ENERGIES {
                let _ = writeln!(
                    output,
                    "- {}: {}",
                    energy.label(),
                    stats.energy_counts.get(energy)
                );
            }
            let _ = writeln!(output, "Mostly {}.", dominant.label());
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recap");
    let _ = writeln!(output, "{}", insights::recap(&stats, None));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Partner support ideas");

    if suggestions.is_empty() {
        let _ = writeln!(output, "Nothing specific this week.");
    } else {
        for suggestion in suggestions.iter() {
            let _ = writeln!(output, "- {}", suggestion.text);
        }
    }

    let mut noted: Vec<&CheckInRecord> = records
        .iter()
        .filter(|record| record.notes.as_deref().is_some_and(|note| !note.trim().is_empty()))
        .collect();
    noted.sort_by(|a, b| b.checkin_date.cmp(&a.checkin_date));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent notes");

    if noted.is_empty() {
        let _ = writeln!(output, "No notes recorded for this window.");
    } else {
        for record in noted.iter().take(5) {
            let slot_label = record
                .slot_value()
                .map(|slot| slot.label())
                .unwrap_or("unspecified");
            let _ = writeln!(
                output,
                "- {} ({}): {}",
                record.checkin_date,
                slot_label,
                record.notes.as_deref().unwrap_or_default()
            );
        }
    }

    output
}
