use chrono::NaiveDate;

use crate::models::Mood;

/// Catalog entry. Empty filter slices mean the nudge is generic.
#[derive(Debug)]
pub struct Nudge {
    pub id: &'static str,
    pub message: &'static str,
    pub category: &'static str,
    pub symptoms: &'static [&'static str],
    pub moods: &'static [Mood],
}

pub const NUDGES: &[Nudge] = &[
    Nudge {
        id: "drink-water",
        message: "Keep a water bottle within reach today.",
        category: "hydration",
        symptoms: &[],
        moods: &[],
    },
    Nudge {
        id: "short-walk",
        message: "A ten minute walk counts. Fresh air helps more than it seems.",
        category: "movement",
        symptoms: &[],
        moods: &[],
    },
    Nudge {
        id: "stretch-break",
        message: "Stand up and stretch for two minutes between tasks.",
        category: "movement",
        symptoms: &[],
        moods: &[],
    },
    Nudge {
        id: "bump-photo",
        message: "Snap a quick bump photo today. Future you will love it.",
        category: "memory",
        symptoms: &[],
        moods: &[],
    },
    Nudge {
        id: "small-win",
        message: "Write down one small thing that went well today.",
        category: "mindfulness",
        symptoms: &[],
        moods: &[],
    },
    Nudge {
        id: "nausea-crackers",
        message: "Plain crackers before getting out of bed can take the edge off nausea.",
        category: "comfort",
        symptoms: &["nausea", "morning sickness"],
        moods: &[],
    },
    Nudge {
        id: "headache-water",
        message: "Headaches often track dehydration. Sip water steadily this afternoon.",
        category: "comfort",
        symptoms: &["headache"],
        moods: &[],
    },
    Nudge {
        id: "backpain-pillow",
        message: "A pillow between your knees tonight can ease your back.",
        category: "comfort",
        symptoms: &["back pain", "cramps"],
        moods: &[],
    },
    Nudge {
        id: "fatigue-nap",
        message: "A twenty minute nap beats another coffee right now.",
        category: "rest",
        symptoms: &["fatigue", "insomnia"],
        moods: &[],
    },
    Nudge {
        id: "heartburn-meals",
        message: "Smaller, slower meals this evening can keep heartburn quiet.",
        category: "comfort",
        symptoms: &["heartburn"],
        moods: &[],
    },
    Nudge {
        id: "reach-out",
        message: "Text someone who makes you laugh. Low days pass quicker with company.",
        category: "connection",
        symptoms: &[],
        moods: &[Mood::Sad],
    },
    Nudge {
        id: "be-gentle",
        message: "Be gentle with yourself today. Rest is productive too.",
        category: "mindfulness",
        symptoms: &[],
        moods: &[Mood::Sad, Mood::Neutral],
    },
    Nudge {
        id: "savor-it",
        message: "Good day? Jot down what made it good while it is fresh.",
        category: "mindfulness",
        symptoms: &[],
        moods: &[Mood::Happy],
    },
];

/// Polynomial rolling hash of the `YYYY-MM-DD` string, wrapped to i32. The
/// wrap is part of the contract: it keeps the per-day pick stable.
pub fn date_hash(date: NaiveDate) -> i32 {
    date.format("%Y-%m-%d")
        .to_string()
        .chars()
        .fold(0i32, |hash, ch| {
            hash.wrapping_mul(31).wrapping_add(ch as i32)
        })
}

/// Pick the day's nudge. Filter tiers fall through on an empty match set:
/// symptom-scoped, then mood-scoped, then fully generic entries.
pub fn pick_nudge(date: NaiveDate, mood: Option<Mood>, symptoms: &[String]) -> &'static Nudge {
    let index = date_hash(date).unsigned_abs() as usize;

    let supplied: Vec<String> = symptoms
        .iter()
        .map(|symptom| symptom.trim().to_lowercase())
        .filter(|symptom| !symptom.is_empty())
        .collect();

    if !supplied.is_empty() {
        let matches: Vec<&'static Nudge> = NUDGES
            .iter()
            .filter(|nudge| {
                nudge
                    .symptoms
                    .iter()
                    .any(|filter| supplied.iter().any(|symptom| symptom == filter))
            })
            .collect();
        if !matches.is_empty() {
            return matches[index % matches.len()];
        }
    }

    if let Some(mood) = mood {
        let matches: Vec<&'static Nudge> = NUDGES
            .iter()
            .filter(|nudge| nudge.moods.contains(&mood))
            .collect();
        if !matches.is_empty() {
            return matches[index % matches.len()];
        }
    }

    let generic: Vec<&'static Nudge> = NUDGES
        .iter()
        .filter(|nudge| nudge.symptoms.is_empty() && nudge.moods.is_empty())
        .collect();
    generic[index % generic.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn catalog_always_has_generic_entries() {
        assert!(NUDGES
            .iter()
            .any(|nudge| nudge.symptoms.is_empty() && nudge.moods.is_empty()));
    }

    #[test]
    fn same_day_same_context_is_stable() {
        let today = date(2026, 8, 6);
        let first = pick_nudge(today, None, &[]);
        let second = pick_nudge(today, None, &[]);
        assert_eq!(first.id, second.id);

        let symptoms = vec!["nausea".to_string()];
        assert_eq!(
            pick_nudge(today, None, &symptoms).id,
            pick_nudge(today, None, &symptoms).id
        );
    }

    #[test]
    fn adjacent_days_hash_differently() {
        assert_ne!(date_hash(date(2026, 8, 6)), date_hash(date(2026, 8, 7)));
        assert_ne!(date_hash(date(2026, 8, 6)), date_hash(date(2026, 9, 6)));
    }

    #[test]
    fn symptom_context_picks_a_scoped_nudge() {
        let symptoms = vec!["Nausea".to_string()];
        let nudge = pick_nudge(date(2026, 8, 6), Some(Mood::Happy), &symptoms);
        assert!(nudge.symptoms.contains(&"nausea"));
    }

    #[test]
    fn unmatched_symptoms_fall_through_to_mood() {
        let symptoms = vec!["hiccups".to_string()];
        let nudge = pick_nudge(date(2026, 8, 6), Some(Mood::Sad), &symptoms);
        assert!(nudge.moods.contains(&Mood::Sad));
    }

    #[test]
    fn no_context_picks_a_generic_nudge() {
        let nudge = pick_nudge(date(2026, 8, 6), None, &[]);
        assert!(nudge.symptoms.is_empty());
        assert!(nudge.moods.is_empty());
    }
}
