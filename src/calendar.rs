use chrono::{DateTime, Utc};

use crate::models::AppointmentRecord;

/// Escape per RFC 5545: backslash first, then structural characters.
pub fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\r', "")
        .replace('\n', "\\n")
}

fn format_utc(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y%m%dT%H%M%SZ").to_string()
}

fn push_line(output: &mut String, line: &str) {
    output.push_str(line);
    output.push_str("\r\n");
}

/// Build an ICS document with one VEVENT per appointment and a 24-hour
/// display alarm on each.
pub fn build_ics(appointments: &[AppointmentRecord], generated_at: DateTime<Utc>) -> String {
    let mut output = String::new();

    push_line(&mut output, "BEGIN:VCALENDAR");
    push_line(&mut output, "VERSION:2.0");
    push_line(&mut output, "PRODID:-//Ivybloom//Weekly Insight//EN");
    push_line(&mut output, "CALSCALE:GREGORIAN");

    for appointment in appointments {
        push_line(&mut output, "BEGIN:VEVENT");
        push_line(&mut output, &format!("UID:{}@ivybloom", appointment.id));
        push_line(&mut output, &format!("DTSTAMP:{}", format_utc(generated_at)));
        push_line(
            &mut output,
            &format!("DTSTART:{}", format_utc(appointment.starts_at)),
        );
        push_line(
            &mut output,
            &format!("SUMMARY:{}", escape_text(&appointment.title)),
        );
        if let Some(location) = appointment.location.as_deref() {
            push_line(&mut output, &format!("LOCATION:{}", escape_text(location)));
        }
        if let Some(notes) = appointment.notes.as_deref() {
            push_line(&mut output, &format!("DESCRIPTION:{}", escape_text(notes)));
        }
        push_line(&mut output, "BEGIN:VALARM");
        push_line(&mut output, "ACTION:DISPLAY");
        push_line(&mut output, "TRIGGER:-PT24H");
        push_line(
            &mut output,
            &format!("DESCRIPTION:{}", escape_text(&appointment.title)),
        );
        push_line(&mut output, "END:VALARM");
        push_line(&mut output, "END:VEVENT");
    }

    push_line(&mut output, "END:VCALENDAR");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_appointment() -> AppointmentRecord {
        AppointmentRecord {
            id: Uuid::parse_str("8f5a1c9e-4a4e-43b1-9a26-5f2f9b6f2e11").unwrap(),
            title: "Anatomy scan; bring notes".to_string(),
            location: Some("City Midwifery, Suite 4".to_string()),
            starts_at: "2026-08-12T14:30:00Z".parse().unwrap(),
            notes: Some("Ask about the glucose test\nand iron levels".to_string()),
        }
    }

    #[test]
    fn escapes_structural_characters() {
        assert_eq!(escape_text("a,b;c\\d"), "a\\,b\\;c\\\\d");
        assert_eq!(escape_text("line one\nline two"), "line one\\nline two");
    }

    #[test]
    fn every_line_ends_with_crlf() {
        let generated_at = "2026-08-06T08:00:00Z".parse().unwrap();
        let ics = build_ics(&[sample_appointment()], generated_at);
        for line in ics.split_inclusive("\r\n") {
            assert!(line.ends_with("\r\n"), "unterminated line: {line:?}");
        }
        assert!(!ics.contains("\n\n"));
    }

    #[test]
    fn event_carries_fields_and_alarm() {
        let generated_at = "2026-08-06T08:00:00Z".parse().unwrap();
        let ics = build_ics(&[sample_appointment()], generated_at);

        assert!(ics.contains("UID:8f5a1c9e-4a4e-43b1-9a26-5f2f9b6f2e11@ivybloom"));
        assert!(ics.contains("DTSTART:20260812T143000Z"));
        assert!(ics.contains("SUMMARY:Anatomy scan\\; bring notes"));
        assert!(ics.contains("LOCATION:City Midwifery\\, Suite 4"));
        assert!(ics.contains("TRIGGER:-PT24H"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    }

    #[test]
    fn empty_export_is_still_a_calendar() {
        let generated_at = "2026-08-06T08:00:00Z".parse().unwrap();
        let ics = build_ics(&[], generated_at);
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(!ics.contains("VEVENT"));
    }
}
