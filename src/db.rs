use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{AppointmentRecord, CheckInRecord, UserRecord};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let users = vec![
        (
            Uuid::parse_str("3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2")?,
            "Maya Chen",
            "maya.chen@example.com",
            NaiveDate::from_ymd_opt(2026, 11, 20).context("invalid date")?,
        ),
        (
            Uuid::parse_str("0c22f1f1-9184-4fd4-9b21-28c68a6a89dc")?,
            "Amara Diallo",
            "amara.diallo@example.com",
            NaiveDate::from_ymd_opt(2027, 1, 8).context("invalid date")?,
        ),
    ];

    for (id, name, email, due_date) in users {
        sqlx::query(
            r#"
            INSERT INTO ivybloom.users (id, display_name, email, due_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET display_name = EXCLUDED.display_name, due_date = EXCLUDED.due_date
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(due_date)
        .fetch_one(pool)
        .await?;
    }

    let check_ins = vec![
        (
            "seed-ci-001",
            "maya.chen@example.com",
            NaiveDate::from_ymd_opt(2026, 7, 31).context("invalid date")?,
            Some("morning"),
            Some("sad"),
            Some("low"),
            Some("Nausea, Fatigue"),
            Some("rough start, skipped breakfast"),
        ),
        (
            "seed-ci-002",
            "maya.chen@example.com",
            NaiveDate::from_ymd_opt(2026, 8, 1).context("invalid date")?,
            Some("evening"),
            Some("neutral"),
            Some("medium"),
            Some("nausea"),
            None,
        ),
        (
            "seed-ci-003",
            "maya.chen@example.com",
            NaiveDate::from_ymd_opt(2026, 8, 3).context("invalid date")?,
            Some("morning"),
            Some("happy"),
            Some("high"),
            None,
            Some("felt the first kicks"),
        ),
        (
            "seed-ci-004",
            "maya.chen@example.com",
            NaiveDate::from_ymd_opt(2026, 8, 4).context("invalid date")?,
            Some("night"),
            Some("sad"),
            Some("low"),
            Some("Back pain, insomnia"),
            Some("could not settle"),
        ),
        (
            "seed-ci-005",
            "amara.diallo@example.com",
            NaiveDate::from_ymd_opt(2026, 8, 2).context("invalid date")?,
            Some("evening"),
            Some("happy"),
            None,
            None,
            None,
        ),
    ];

    for (source_key, email, checkin_date, slot, mood, energy, symptoms, notes) in check_ins {
        let user_id: Uuid = sqlx::query("SELECT id FROM ivybloom.users WHERE email = $1")
            .bind(email)
            .fetch_one(pool)
            .await?
            .get("id");

        sqlx::query(
            r#"
            INSERT INTO ivybloom.check_ins
            (id, user_id, checkin_date, slot, time_of_day, mood, energy, symptoms, notes, source_key)
            VALUES ($1, $2, $3, $4, NULL, $5, $6, $7, $8, $9)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(checkin_date)
        .bind(slot)
        .bind(mood)
        .bind(energy)
        .bind(symptoms)
        .bind(notes)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let maya: Uuid = sqlx::query("SELECT id FROM ivybloom.users WHERE email = $1")
        .bind("maya.chen@example.com")
        .fetch_one(pool)
        .await?
        .get("id");

    sqlx::query(
        r#"
        INSERT INTO ivybloom.appointments (id, user_id, title, location, starts_at, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(Uuid::parse_str("8f5a1c9e-4a4e-43b1-9a26-5f2f9b6f2e11")?)
    .bind(maya)
    .bind("Anatomy scan")
    .bind("City Midwifery, Suite 4")
    .bind("2026-08-12T14:30:00Z".parse::<DateTime<Utc>>()?)
    .bind("Ask about the glucose test")
    .execute(pool)
    .await?;

    info!("seed data inserted");
    Ok(())
}

pub async fn find_user(pool: &PgPool, email: &str) -> anyhow::Result<UserRecord> {
    let row = sqlx::query(
        "SELECT id, display_name, email, due_date FROM ivybloom.users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("no user registered for {email}"))?;

    Ok(UserRecord {
        id: row.get("id"),
        display_name: row.get("display_name"),
        email: row.get("email"),
        due_date: row.get("due_date"),
    })
}

pub async fn insert_checkin(
    pool: &PgPool,
    user_id: Uuid,
    checkin_date: NaiveDate,
    slot: &str,
    mood: &str,
    energy: Option<&str>,
    symptoms: Option<&str>,
    notes: Option<&str>,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO ivybloom.check_ins
        (id, user_id, checkin_date, slot, mood, energy, symptoms, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(checkin_date)
    .bind(slot)
    .bind(mood)
    .bind(energy)
    .bind(symptoms)
    .bind(notes)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn fetch_checkins(
    pool: &PgPool,
    window_start: NaiveDate,
    as_of: NaiveDate,
    email: Option<&str>,
) -> anyhow::Result<Vec<CheckInRecord>> {
    let mut query = String::from(
        "SELECT u.id AS user_id, u.display_name, u.email, c.checkin_date, \
         c.slot, c.time_of_day, c.mood, c.energy, c.symptoms, c.notes \
         FROM ivybloom.check_ins c \
         JOIN ivybloom.users u ON u.id = c.user_id \
         WHERE c.checkin_date BETWEEN $1 AND $2",
    );

    if email.is_some() {
        query.push_str(" AND u.email = $3");
    }
    query.push_str(" ORDER BY c.checkin_date");

    let mut rows = sqlx::query(&query).bind(window_start).bind(as_of);
    if let Some(value) = email {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    debug!(count = records.len(), "fetched check-ins");

    let mut check_ins = Vec::new();
    for row in records {
        check_ins.push(CheckInRecord {
            user_id: row.get("user_id"),
            user_name: row.get("display_name"),
            user_email: row.get("email"),
            checkin_date: row.get("checkin_date"),
            slot: row.get("slot"),
            time_of_day: row.get("time_of_day"),
            mood: row.get("mood"),
            energy: row.get("energy"),
            symptoms: row.get("symptoms"),
            notes: row.get("notes"),
        });
    }

    Ok(check_ins)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        due_date: Option<NaiveDate>,
        checkin_date: NaiveDate,
        slot: Option<String>,
        time_of_day: Option<String>,
        mood: Option<String>,
        energy: Option<String>,
        symptoms: Option<String>,
        notes: Option<String>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let user_id: Uuid = sqlx::query(
            r#"
            INSERT INTO ivybloom.users (id, display_name, email, due_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                due_date = COALESCE(EXCLUDED.due_date, ivybloom.users.due_date)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.full_name)
        .bind(&row.email)
        .bind(row.due_date)
        .fetch_one(pool)
        .await?
        .get("id");

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO ivybloom.check_ins
            (id, user_id, checkin_date, slot, time_of_day, mood, energy, symptoms, notes, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(row.checkin_date)
        .bind(&row.slot)
        .bind(&row.time_of_day)
        .bind(&row.mood)
        .bind(&row.energy)
        .bind(&row.symptoms)
        .bind(&row.notes)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    info!(inserted, "csv import finished");
    Ok(inserted)
}

pub async fn insert_appointment(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    location: Option<&str>,
    starts_at: DateTime<Utc>,
    notes: Option<&str>,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO ivybloom.appointments (id, user_id, title, location, starts_at, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(title)
    .bind(location)
    .bind(starts_at)
    .bind(notes)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn fetch_appointments(
    pool: &PgPool,
    email: &str,
    from: DateTime<Utc>,
) -> anyhow::Result<Vec<AppointmentRecord>> {
    let rows = sqlx::query(
        "SELECT a.id, a.title, a.location, a.starts_at, a.notes \
         FROM ivybloom.appointments a \
         JOIN ivybloom.users u ON u.id = a.user_id \
         WHERE u.email = $1 AND a.starts_at >= $2 \
         ORDER BY a.starts_at",
    )
    .bind(email)
    .bind(from)
    .fetch_all(pool)
    .await?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(AppointmentRecord {
            id: row.get("id"),
            title: row.get("title"),
            location: row.get("location"),
            starts_at: row.get("starts_at"),
            notes: row.get("notes"),
        });
    }

    Ok(appointments)
}

/// Any appointment within the seven days after `as_of`.
pub async fn has_upcoming_appointment(
    pool: &PgPool,
    user_id: Uuid,
    as_of: NaiveDate,
) -> anyhow::Result<bool> {
    let from = as_of.and_time(NaiveTime::MIN).and_utc();
    let until = from + Duration::days(7);

    let row = sqlx::query(
        "SELECT EXISTS( \
         SELECT 1 FROM ivybloom.appointments \
         WHERE user_id = $1 AND starts_at >= $2 AND starts_at < $3) AS upcoming",
    )
    .bind(user_id)
    .bind(from)
    .bind(until)
    .fetch_one(pool)
    .await?;

    Ok(row.get("upcoming"))
}

pub async fn create_partner_invite(
    pool: &PgPool,
    user_id: Uuid,
    partner_email: &str,
) -> anyhow::Result<Uuid> {
    let token = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO ivybloom.partner_links (id, user_id, partner_email, token, status)
        VALUES ($1, $2, $3, $4, 'pending')
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(partner_email)
    .bind(token)
    .execute(pool)
    .await?;

    Ok(token)
}

/// Single-use accept: a pending token flips to accepted exactly once.
pub async fn accept_partner_invite(pool: &PgPool, token: Uuid) -> anyhow::Result<String> {
    let row = sqlx::query(
        r#"
        UPDATE ivybloom.partner_links
        SET status = 'accepted', accepted_at = NOW()
        WHERE token = $1 AND status = 'pending'
        RETURNING user_id
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?
    .context("invite token not found or already used")?;

    let user_id: Uuid = row.get("user_id");
    let name = sqlx::query("SELECT display_name FROM ivybloom.users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(name.get("display_name"))
}

/// The linked user behind an accepted partner token.
pub async fn partner_view_user(pool: &PgPool, token: Uuid) -> anyhow::Result<UserRecord> {
    let row = sqlx::query(
        "SELECT u.id, u.display_name, u.email, u.due_date \
         FROM ivybloom.partner_links l \
         JOIN ivybloom.users u ON u.id = l.user_id \
         WHERE l.token = $1 AND l.status = 'accepted'",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?
    .context("no accepted partner link for this token")?;

    Ok(UserRecord {
        id: row.get("id"),
        display_name: row.get("display_name"),
        email: row.get("email"),
        due_date: row.get("due_date"),
    })
}

pub async fn set_pref(
    pool: &PgPool,
    user_id: Uuid,
    key: &str,
    value: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO ivybloom.prefs (user_id, key, value)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, key) DO UPDATE SET value = EXCLUDED.value
        "#,
    )
    .bind(user_id)
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_pref(pool: &PgPool, user_id: Uuid, key: &str) -> anyhow::Result<Option<String>> {
    let row = sqlx::query("SELECT value FROM ivybloom.prefs WHERE user_id = $1 AND key = $2")
        .bind(user_id)
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| row.get("value")))
}
