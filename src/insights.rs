use crate::models::{
    CheckInRecord, Energy, EnergyCounts, Mood, MoodCounts, Slot, SlotCounts, SupportSuggestion,
    WeekStats, ENERGIES, MOODS, SLOTS,
};

/// Aggregate one trailing week of check-ins. Pure and idempotent; callers may
/// recompute on every render. Unrecognized mood/slot/energy values are not
/// counted rather than rejected.
pub fn aggregate_week(records: &[CheckInRecord]) -> WeekStats {
    let mut mood_counts = MoodCounts::default();
    let mut slot_counts = SlotCounts::default();
    let mut energy_counts = EnergyCounts::default();
    // Insertion-ordered so frequency ties keep first-encounter order.
    let mut symptom_freq: Vec<(String, usize)> = Vec::new();
    let mut saw_energy = false;

    for record in records {
        if let Some(mood) = record.mood_value() {
            mood_counts.bump(mood);
        }

        if let Some(symptoms) = record.symptoms.as_deref() {
            for token in symptoms.split(',') {
                let token = token.trim().to_lowercase();
                if token.is_empty() {
                    continue;
                }
                match symptom_freq.iter_mut().find(|(known, _)| *known == token) {
                    Some(entry) => entry.1 += 1,
                    None => symptom_freq.push((token, 1)),
                }
            }
        }

        if let Some(slot) = record.slot_value() {
            slot_counts.bump(slot);
        }

        if let Some(energy) = record.energy_value() {
            energy_counts.bump(energy);
            saw_energy = true;
        }
    }

    // Stable sort: equal counts stay in first-encounter order.
    symptom_freq.sort_by(|a, b| b.1.cmp(&a.1));
    let top_symptoms: Vec<String> = symptom_freq
        .iter()
        .take(3)
        .map(|(token, _)| capitalize(token))
        .collect();

    WeekStats {
        total_checkins: records.len(),
        dominant_mood: dominant(&MOODS, |mood| mood_counts.get(mood)),
        mood_counts,
        top_symptoms,
        challenging_slot: challenging_slot(records, slot_counts),
        slot_counts,
        dominant_energy: if saw_energy {
            dominant(&ENERGIES, |energy| energy_counts.get(energy))
        } else {
            None
        },
        energy_counts,
    }
}

fn dominant<T: Copy>(order: &[T], count: impl Fn(T) -> usize) -> Option<T> {
    let mut best: Option<(T, usize)> = None;
    for &value in order {
        let observed = count(value);
        if observed > 0 && best.map_or(true, |(_, top)| observed > top) {
            best = Some((value, observed));
        }
    }
    best.map(|(value, _)| value)
}

/// Among slots with at least one record, the one with the most sad check-ins.
/// Second full pass over the records; ties keep enumeration order.
fn challenging_slot(records: &[CheckInRecord], slot_counts: SlotCounts) -> Option<Slot> {
    let mut best: Option<(Slot, usize)> = None;
    for &slot in &SLOTS {
        if slot_counts.get(slot) == 0 {
            continue;
        }
        let sad = records
            .iter()
            .filter(|record| {
                record.slot_value() == Some(slot) && record.mood_value() == Some(Mood::Sad)
            })
            .count();
        if best.map_or(true, |(_, top)| sad > top) {
            best = Some((slot, sad));
        }
    }
    best.map(|(slot, _)| slot)
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Partner-support suggestions. The conditional order and the three-item cap
/// are a stability contract: callers and tests depend on both.
pub fn support_suggestions(
    stats: &WeekStats,
    trimester: u8,
    has_upcoming_appointment: bool,
) -> Vec<SupportSuggestion> {
    let mut suggestions = Vec::new();

    if stats.dominant_energy == Some(Energy::Low) {
        suggestions.push(SupportSuggestion {
            topic: "rest",
            text: "Energy ran low this week. Plan a quiet evening and take a chore off their plate.",
        });
    }
    if symptom_present(stats, &["headache"]) {
        suggestions.push(SupportSuggestion {
            topic: "headache",
            text: "Headaches came up this week. Keep water nearby and keep the evenings low-key.",
        });
    }
    if symptom_present(stats, &["nausea"]) {
        suggestions.push(SupportSuggestion {
            topic: "nausea",
            text: "Nausea has been frequent. Keep bland snacks like crackers within easy reach.",
        });
    }
    if symptom_present(stats, &["back pain", "cramp"]) {
        suggestions.push(SupportSuggestion {
            topic: "relief",
            text: "Back pain or cramps showed up. Offer a gentle back rub or a warm compress.",
        });
    }
    if symptom_present(stats, &["insomnia", "fatigue"]) {
        suggestions.push(SupportSuggestion {
            topic: "sleep",
            text: "Sleep has been rough. Help wind down earlier and keep the mornings unhurried.",
        });
    }
    if stats.dominant_mood == Some(Mood::Sad) {
        suggestions.push(SupportSuggestion {
            topic: "mood",
            text: "The week felt heavy. Check in gently and plan something small to look forward to.",
        });
    }
    if has_upcoming_appointment {
        suggestions.push(SupportSuggestion {
            topic: "appointment",
            text: "An appointment is coming up. Offer to come along and help note questions to ask.",
        });
    }

    if suggestions.len() < 2 {
        suggestions.push(match trimester {
            1 => SupportSuggestion {
                topic: "trimester",
                text: "The first trimester is tiring. Small gestures like handling dinner go a long way.",
            },
            2 => SupportSuggestion {
                topic: "trimester",
                text: "The second trimester is a good window for plans. Book something fun together.",
            },
            _ => SupportSuggestion {
                topic: "trimester",
                text: "The third trimester gets uncomfortable. Take over the lifting and keep plans flexible.",
            },
        });
    }

    suggestions.truncate(3);
    suggestions
}

fn symptom_present(stats: &WeekStats, needles: &[&str]) -> bool {
    stats.top_symptoms.iter().any(|symptom| {
        let symptom = symptom.to_lowercase();
        needles.iter().any(|needle| symptom.contains(needle))
    })
}

/// One-paragraph recap. `name` switches to the partner view, which speaks
/// about the linked user instead of to them.
pub fn recap(stats: &WeekStats, name: Option<&str>) -> String {
    if stats.total_checkins == 0 {
        return match name {
            Some(name) => format!("{name} has no check-ins logged this week yet."),
            None => "No check-ins logged this week yet. The first one takes under a minute."
                .to_string(),
        };
    }

    let subject = name.unwrap_or("You");
    let mut sentences = vec![format!(
        "{subject} logged {} check-in{} this week.",
        stats.total_checkins,
        if stats.total_checkins == 1 { "" } else { "s" }
    )];

    if let Some(mood) = stats.dominant_mood {
        sentences.push(format!("Mood leaned {} overall.", mood.label()));
    }
    if !stats.top_symptoms.is_empty() {
        sentences.push(format!(
            "{} came up most often.",
            join_list(&stats.top_symptoms)
        ));
    }
    if let Some(slot) = stats.challenging_slot {
        if stats.mood_counts.sad > 0 {
            sentences.push(format!(
                "{} were the roughest stretch.",
                plural_slot(slot)
            ));
        }
    }
    if let Some(energy) = stats.dominant_energy {
        sentences.push(format!("Energy mostly ran {}.", energy.label()));
    }

    sentences.join(" ")
}

fn plural_slot(slot: Slot) -> &'static str {
    match slot {
        Slot::Morning => "Mornings",
        Slot::Evening => "Evenings",
        Slot::Night => "Nights",
    }
}

fn join_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn sample_checkin(
        mood: Option<&str>,
        symptoms: Option<&str>,
        slot: Option<&str>,
        energy: Option<&str>,
    ) -> CheckInRecord {
        CheckInRecord {
            user_id: Uuid::new_v4(),
            user_name: "Maya Chen".to_string(),
            user_email: "maya.chen@example.com".to_string(),
            checkin_date: NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
            slot: slot.map(str::to_string),
            time_of_day: None,
            mood: mood.map(str::to_string),
            energy: energy.map(str::to_string),
            symptoms: symptoms.map(str::to_string),
            notes: None,
        }
    }

    #[test]
    fn empty_input_yields_no_data_stats() {
        let stats = aggregate_week(&[]);
        assert_eq!(stats.total_checkins, 0);
        assert_eq!(stats.dominant_mood, None);
        assert_eq!(stats.dominant_energy, None);
        assert_eq!(stats.challenging_slot, None);
        assert!(stats.top_symptoms.is_empty());
    }

    #[test]
    fn mood_counts_and_dominant_mood() {
        let records = vec![
            sample_checkin(Some("happy"), None, None, None),
            sample_checkin(Some("happy"), None, None, None),
            sample_checkin(Some("sad"), None, None, None),
        ];
        let stats = aggregate_week(&records);
        assert_eq!(stats.mood_counts.happy, 2);
        assert_eq!(stats.mood_counts.neutral, 0);
        assert_eq!(stats.mood_counts.sad, 1);
        assert_eq!(stats.dominant_mood, Some(Mood::Happy));
    }

    #[test]
    fn unrecognized_moods_are_not_counted() {
        let records = vec![
            sample_checkin(Some("happy"), None, None, None),
            sample_checkin(Some("overjoyed"), None, None, None),
            sample_checkin(None, None, None, None),
        ];
        let stats = aggregate_week(&records);
        let counted = stats.mood_counts.happy + stats.mood_counts.neutral + stats.mood_counts.sad;
        assert_eq!(counted, 1);
        assert_eq!(stats.total_checkins, 3);
    }

    #[test]
    fn symptoms_normalize_and_rank() {
        let records = vec![
            sample_checkin(None, Some("Nausea, Fatigue"), None, None),
            sample_checkin(None, Some("nausea"), None, None),
        ];
        let stats = aggregate_week(&records);
        assert_eq!(stats.top_symptoms, vec!["Nausea", "Fatigue"]);
    }

    #[test]
    fn symptom_ties_keep_first_encounter_order() {
        let records = vec![
            sample_checkin(None, Some("cramps, heartburn"), None, None),
            sample_checkin(None, Some("swelling, heartburn"), None, None),
            sample_checkin(None, Some("cramps, swelling"), None, None),
            sample_checkin(None, Some("insomnia"), None, None),
        ];
        let stats = aggregate_week(&records);
        assert_eq!(stats.top_symptoms, vec!["Cramps", "Heartburn", "Swelling"]);
    }

    #[test]
    fn challenging_slot_tie_breaks_by_enumeration_order() {
        let records = vec![
            sample_checkin(Some("sad"), None, Some("morning"), None),
            sample_checkin(Some("happy"), None, Some("morning"), None),
            sample_checkin(Some("sad"), None, Some("night"), None),
        ];
        let stats = aggregate_week(&records);
        assert_eq!(stats.challenging_slot, Some(Slot::Morning));
    }

    #[test]
    fn challenging_slot_prefers_most_sad_records() {
        let records = vec![
            sample_checkin(Some("happy"), None, Some("morning"), None),
            sample_checkin(Some("sad"), None, Some("night"), None),
            sample_checkin(Some("sad"), None, Some("night"), None),
        ];
        let stats = aggregate_week(&records);
        assert_eq!(stats.challenging_slot, Some(Slot::Night));
    }

    #[test]
    fn dominant_energy_only_when_energy_observed() {
        let without = aggregate_week(&[sample_checkin(Some("happy"), None, None, None)]);
        assert_eq!(without.dominant_energy, None);

        let with = aggregate_week(&[
            sample_checkin(None, None, None, Some("low")),
            sample_checkin(None, None, None, Some("low")),
            sample_checkin(None, None, None, Some("high")),
        ]);
        assert_eq!(with.dominant_energy, Some(Energy::Low));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let records = vec![
            sample_checkin(Some("sad"), Some("nausea, headache"), Some("evening"), Some("low")),
            sample_checkin(Some("happy"), Some("nausea"), Some("morning"), Some("medium")),
        ];
        assert_eq!(aggregate_week(&records), aggregate_week(&records));
    }

    #[test]
    fn suggestion_order_matches_condition_priority() {
        let stats = WeekStats {
            dominant_energy: Some(Energy::Low),
            top_symptoms: vec!["Headache".to_string()],
            dominant_mood: Some(Mood::Neutral),
            ..WeekStats::default()
        };
        let suggestions = support_suggestions(&stats, 1, false);
        let topics: Vec<&str> = suggestions.iter().map(|s| s.topic).collect();
        // Two matches already, so no trimester filler.
        assert_eq!(topics, vec!["rest", "headache"]);
    }

    #[test]
    fn suggestions_cap_at_three() {
        let stats = WeekStats {
            dominant_energy: Some(Energy::Low),
            top_symptoms: vec![
                "Headache".to_string(),
                "Nausea".to_string(),
                "Back pain".to_string(),
            ],
            dominant_mood: Some(Mood::Sad),
            ..WeekStats::default()
        };
        let suggestions = support_suggestions(&stats, 2, true);
        let topics: Vec<&str> = suggestions.iter().map(|s| s.topic).collect();
        assert_eq!(topics, vec!["rest", "headache", "nausea"]);
    }

    #[test]
    fn trimester_filler_when_fewer_than_two_matches() {
        let stats = WeekStats {
            dominant_mood: Some(Mood::Sad),
            ..WeekStats::default()
        };
        let suggestions = support_suggestions(&stats, 3, false);
        let topics: Vec<&str> = suggestions.iter().map(|s| s.topic).collect();
        assert_eq!(topics, vec!["mood", "trimester"]);

        let none_matched = support_suggestions(&WeekStats::default(), 1, false);
        assert_eq!(none_matched.len(), 1);
        assert_eq!(none_matched[0].topic, "trimester");
    }

    #[test]
    fn recap_switches_between_second_person_and_partner_view() {
        let records = vec![
            sample_checkin(Some("happy"), Some("nausea"), Some("morning"), Some("high")),
            sample_checkin(Some("happy"), None, Some("evening"), None),
        ];
        let stats = aggregate_week(&records);

        let own = recap(&stats, None);
        assert!(own.starts_with("You logged 2 check-ins"));
        assert!(own.contains("Mood leaned happy"));

        let partner = recap(&stats, Some("Maya"));
        assert!(partner.starts_with("Maya logged 2 check-ins"));
    }

    #[test]
    fn recap_handles_empty_week() {
        let stats = aggregate_week(&[]);
        assert!(recap(&stats, None).starts_with("No check-ins logged"));
        assert_eq!(
            recap(&stats, Some("Maya")),
            "Maya has no check-ins logged this week yet."
        );
    }
}
