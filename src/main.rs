use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Duration, Local, NaiveDate, Timelike, Utc};
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod calendar;
mod db;
mod insights;
mod models;
mod nudges;
mod reminders;
mod report;
mod slots;

use models::{Energy, Mood, Slot, UserRecord, SLOTS};

#[derive(Parser)]
#[command(name = "weekly-insight")]
#[command(about = "Weekly check-in insight engine for Ivybloom", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import check-ins from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Record a check-in, suggesting the slot from the hour when not given
    #[command(group(
        ArgGroup::new("when")
            .args(["slot", "hour"])
            .multiple(false)
    ))]
    CheckIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        mood: String,
        #[arg(long)]
        energy: Option<String>,
        #[arg(long)]
        symptoms: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        slot: Option<String>,
        #[arg(long)]
        hour: Option<u32>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Compute the weekly insight bundle for the trailing seven days
    Insights {
        #[arg(long)]
        email: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        trimester: Option<u8>,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown weekly recap report
    Report {
        #[arg(long)]
        email: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        trimester: Option<u8>,
        #[arg(long, default_value = "weekly-recap.md")]
        out: PathBuf,
    },
    /// Show the day's nudge, contextualized by today's check-ins
    Nudge {
        #[arg(long)]
        email: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Mark the day's nudge as completed
        #[arg(long)]
        done: bool,
    },
    /// Manage appointments
    Appointment {
        #[command(subcommand)]
        command: AppointmentCommands,
    },
    /// Export upcoming appointments as an ICS calendar
    Calendar {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "appointments.ics")]
        out: PathBuf,
    },
    /// Show upcoming check-in and appointment reminder times
    Reminders {
        #[arg(long)]
        email: String,
    },
    /// Manage partner sharing
    Partner {
        #[command(subcommand)]
        command: PartnerCommands,
    },
}

#[derive(Subcommand)]
enum AppointmentCommands {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        location: Option<String>,
        /// RFC 3339, e.g. 2026-08-12T14:30:00Z
        #[arg(long)]
        starts_at: DateTime<Utc>,
        #[arg(long)]
        notes: Option<String>,
    },
    List {
        #[arg(long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum PartnerCommands {
    /// Create an invite token for a partner
    Invite {
        #[arg(long)]
        email: String,
        #[arg(long)]
        partner_email: String,
    },
    /// Accept an invite token
    Accept {
        #[arg(long)]
        token: Uuid,
    },
    /// Show the partner view of the weekly recap
    Recap {
        #[arg(long)]
        token: Uuid,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to the Ivybloom Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} check-ins from {}.", csv.display());
        }
        Commands::CheckIn {
            email,
            mood,
            energy,
            symptoms,
            notes,
            slot,
            hour,
            date,
        } => {
            let now = Local::now();
            let checkin_date = date.unwrap_or_else(|| now.date_naive());
            let hour = hour.unwrap_or_else(|| now.hour());

            let mood = Mood::parse(&mood).context("mood must be happy, neutral, or sad")?;
            let energy = energy
                .as_deref()
                .map(|raw| Energy::parse(raw).context("energy must be high, medium, or low"))
                .transpose()?;
            let slot = match slot.as_deref() {
                Some(raw) => Slot::parse(raw).context("slot must be morning, evening, or night")?,
                None => slots::suggested_slot(hour),
            };

            let user = db::find_user(&pool, &email).await?;
            db::insert_checkin(
                &pool,
                user.id,
                checkin_date,
                slot.label(),
                mood.label(),
                energy.map(Energy::label),
                symptoms.as_deref(),
                notes.as_deref(),
            )
            .await?;

            println!(
                "Recorded this {}'s check-in for {} ({} slot, {}).",
                slots::day_period(hour),
                user.display_name,
                slot.label(),
                checkin_date
            );
        }
        Commands::Insights {
            email,
            date,
            trimester,
            json,
        } => {
            let as_of = date.unwrap_or_else(|| Utc::now().date_naive());
            let window_start = as_of - Duration::days(6);
            let user = db::find_user(&pool, &email).await?;

            let records =
                db::fetch_checkins(&pool, window_start, as_of, Some(email.as_str())).await?;
            let stats = insights::aggregate_week(&records);
            let trimester = resolve_trimester(&user, trimester, as_of);
            let has_upcoming = db::has_upcoming_appointment(&pool, user.id, as_of).await?;
            let suggestions = insights::support_suggestions(&stats, trimester, has_upcoming);
            let recap = insights::recap(&stats, None);

            if json {
                let bundle = serde_json::json!({
                    "window_start": window_start,
                    "as_of": as_of,
                    "trimester": trimester,
                    "has_upcoming_appointment": has_upcoming,
                    "stats": stats,
                    "recap": recap,
                    "suggestions": suggestions,
                });
                println!("{}", serde_json::to_string_pretty(&bundle)?);
            } else {
                println!(
                    "Weekly insight for {} ({} to {}):",
                    user.display_name, window_start, as_of
                );
                println!("{recap}");
                if !suggestions.is_empty() {
                    println!("Partner support ideas:");
                    for suggestion in suggestions.iter() {
                        println!("- [{}] {}", suggestion.topic, suggestion.text);
                    }
                }
            }
        }
        Commands::Report {
            email,
            date,
            trimester,
            out,
        } => {
            let as_of = date.unwrap_or_else(|| Utc::now().date_naive());
            let window_start = as_of - Duration::days(6);
            let user = db::find_user(&pool, &email).await?;

            let records =
                db::fetch_checkins(&pool, window_start, as_of, Some(email.as_str())).await?;
            let trimester = resolve_trimester(&user, trimester, as_of);
            let has_upcoming = db::has_upcoming_appointment(&pool, user.id, as_of).await?;
            let report = report::build_report(
                &user.display_name,
                window_start,
                as_of,
                &records,
                trimester,
                has_upcoming,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Nudge { email, date, done } => {
            let as_of = date.unwrap_or_else(|| Utc::now().date_naive());
            let user = db::find_user(&pool, &email).await?;

            let today = db::fetch_checkins(&pool, as_of, as_of, Some(email.as_str())).await?;
            let mood = today.iter().filter_map(|record| record.mood_value()).last();
            let symptoms: Vec<String> = today
                .iter()
                .filter_map(|record| record.symptoms.as_deref())
                .flat_map(|raw| raw.split(','))
                .map(|token| token.trim().to_lowercase())
                .filter(|token| !token.is_empty())
                .collect();

            let nudge = nudges::pick_nudge(as_of, mood, &symptoms);
            let done_key = format!("nudge-done:{as_of}");

            if done {
                db::set_pref(&pool, user.id, &done_key, nudge.id).await?;
                println!("Marked today's nudge as done: {}", nudge.message);
            } else if db::get_pref(&pool, user.id, &done_key).await?.is_some() {
                println!("[{}] {} (completed today)", nudge.category, nudge.message);
            } else {
                println!("[{}] {}", nudge.category, nudge.message);
            }
        }
        Commands::Appointment { command } => match command {
            AppointmentCommands::Add {
                email,
                title,
                location,
                starts_at,
                notes,
            } => {
                let user = db::find_user(&pool, &email).await?;
                db::insert_appointment(
                    &pool,
                    user.id,
                    &title,
                    location.as_deref(),
                    starts_at,
                    notes.as_deref(),
                )
                .await?;
                println!("Appointment \"{title}\" added for {}.", user.display_name);
            }
            AppointmentCommands::List { email } => {
                let appointments = db::fetch_appointments(&pool, &email, Utc::now()).await?;
                if appointments.is_empty() {
                    println!("No upcoming appointments.");
                } else {
                    for appointment in appointments.iter() {
                        println!(
                            "- {} at {}{}",
                            appointment.title,
                            appointment.starts_at,
                            appointment
                                .location
                                .as_deref()
                                .map(|location| format!(" ({location})"))
                                .unwrap_or_default()
                        );
                    }
                }
            }
        },
        Commands::Calendar { email, out } => {
            let appointments = db::fetch_appointments(&pool, &email, Utc::now()).await?;
            let ics = calendar::build_ics(&appointments, Utc::now());
            std::fs::write(&out, ics)?;
            println!(
                "Exported {} appointment(s) to {}.",
                appointments.len(),
                out.display()
            );
        }
        Commands::Reminders { email } => {
            let now_local = Local::now().naive_local();
            println!("Check-in reminders:");
            for slot in SLOTS {
                println!(
                    "- {}: next at {}",
                    slot.label(),
                    reminders::next_slot_reminder(slot, now_local)
                );
            }

            let appointments = db::fetch_appointments(&pool, &email, Utc::now()).await?;
            if !appointments.is_empty() {
                println!("Appointment reminders:");
                for appointment in appointments.iter() {
                    match reminders::appointment_reminder(appointment.starts_at, Utc::now()) {
                        Some(fire_at) => println!(
                            "- {} on {}: reminder at {}",
                            appointment.title, appointment.starts_at, fire_at
                        ),
                        None => println!(
                            "- {} on {}: reminder window passed",
                            appointment.title, appointment.starts_at
                        ),
                    }
                }
            }
        }
        Commands::Partner { command } => match command {
            PartnerCommands::Invite {
                email,
                partner_email,
            } => {
                let user = db::find_user(&pool, &email).await?;
                let token = db::create_partner_invite(&pool, user.id, &partner_email).await?;
                println!("Invite created for {partner_email}. Share this token: {token}");
            }
            PartnerCommands::Accept { token } => {
                let name = db::accept_partner_invite(&pool, token).await?;
                println!("You're linked with {name}. Weekly recaps are now shared.");
            }
            PartnerCommands::Recap { token, date } => {
                let as_of = date.unwrap_or_else(|| Utc::now().date_naive());
                let window_start = as_of - Duration::days(6);
                let user = db::partner_view_user(&pool, token).await?;

                let records =
                    db::fetch_checkins(&pool, window_start, as_of, Some(user.email.as_str())).await?;
                let stats = insights::aggregate_week(&records);
                let trimester = resolve_trimester(&user, None, as_of);
                let has_upcoming =
                    db::has_upcoming_appointment(&pool, user.id, as_of).await?;
                let suggestions =
                    insights::support_suggestions(&stats, trimester, has_upcoming);

                println!("{}", insights::recap(&stats, Some(user.display_name.as_str())));
                if !suggestions.is_empty() {
                    println!("Ways to help this week:");
                    for suggestion in suggestions.iter() {
                        println!("- {}", suggestion.text);
                    }
                }
            }
        },
    }

    Ok(())
}

fn resolve_trimester(user: &UserRecord, explicit: Option<u8>, as_of: NaiveDate) -> u8 {
    explicit
        .or_else(|| {
            user.due_date
                .map(|due_date| models::trimester_on(due_date, as_of))
        })
        .unwrap_or(2)
}
