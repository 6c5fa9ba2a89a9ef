//! Database operations for scraped sections.
//!
//! Two tables: `course_sections` holds the latest record per natural key
//! (replace-or-insert), `section_snapshots` is an append-only time series of
//! capacity numbers keyed by capture timestamp.

use anyhow::Result;
use chrono::{Local, Utc};
use sqlx::PgPool;
use tracing::debug;

use crate::data::course::CourseSection;

/// Upsert the full record set by natural key. Returns the row count written.
pub async fn upsert_sections(pool: &PgPool, sections: &[CourseSection]) -> Result<u64> {
    if sections.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for section in sections {
        let id = &section.identity;
        let seats = &section.seats;
        let sched = section.schedule_strings();
        sqlx::query(
            r#"
            INSERT INTO course_sections (
                semester, year, class_number,
                name, subject_name, subject_code, catalog_number,
                academic_career, section_type, section_code, session,
                days, time_start, time_end, classroom, instructor,
                start_date, end_date, topic,
                status, seats_available, capacity,
                waitlist_available, waitlist_capacity,
                reserved_available, reserved_capacity,
                multiple_meetings, retrieved_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26,
                $27, $28
            )
            ON CONFLICT (semester, year, class_number) DO UPDATE SET
                name = EXCLUDED.name,
                subject_name = EXCLUDED.subject_name,
                subject_code = EXCLUDED.subject_code,
                catalog_number = EXCLUDED.catalog_number,
                academic_career = EXCLUDED.academic_career,
                section_type = EXCLUDED.section_type,
                section_code = EXCLUDED.section_code,
                session = EXCLUDED.session,
                days = EXCLUDED.days,
                time_start = EXCLUDED.time_start,
                time_end = EXCLUDED.time_end,
                classroom = EXCLUDED.classroom,
                instructor = EXCLUDED.instructor,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                topic = EXCLUDED.topic,
                status = EXCLUDED.status,
                seats_available = EXCLUDED.seats_available,
                capacity = EXCLUDED.capacity,
                waitlist_available = EXCLUDED.waitlist_available,
                waitlist_capacity = EXCLUDED.waitlist_capacity,
                reserved_available = EXCLUDED.reserved_available,
                reserved_capacity = EXCLUDED.reserved_capacity,
                multiple_meetings = EXCLUDED.multiple_meetings,
                retrieved_at = EXCLUDED.retrieved_at
            "#,
        )
        .bind(&id.semester)
        .bind(id.year)
        .bind(id.class_number as i64)
        .bind(&id.name)
        .bind(&id.subject_name)
        .bind(&id.subject_code)
        .bind(&id.catalog_number)
        .bind(&id.academic_career)
        .bind(&id.section_type)
        .bind(&id.section_code)
        .bind(&id.session)
        .bind(&sched.days)
        .bind(&sched.time_start)
        .bind(&sched.time_end)
        .bind(&sched.classroom)
        .bind(&sched.instructor)
        .bind(&sched.start_date)
        .bind(&sched.end_date)
        .bind(&sched.topic)
        .bind(seats.status.as_str())
        .bind(seats.seats_available as i32)
        .bind(seats.capacity as i32)
        .bind(seats.waitlist_available as i32)
        .bind(seats.waitlist_capacity as i32)
        .bind(seats.reserved.map(|r| r.available as i32))
        .bind(seats.reserved.map(|r| r.capacity as i32))
        .bind(section.schedule.is_multiple())
        .bind(section.retrieved_at)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    debug!(count = sections.len(), "sections upserted");
    Ok(sections.len() as u64)
}

/// Append one time-series snapshot row per section.
pub async fn insert_snapshots(pool: &PgPool, sections: &[CourseSection]) -> Result<u64> {
    if sections.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for section in sections {
        let id = &section.identity;
        let seats = &section.seats;
        sqlx::query(
            r#"
            INSERT INTO section_snapshots (
                retrieved_at, semester, year, class_number,
                status, seats_available, waitlist_available, reserved_available
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(section.retrieved_at)
        .bind(&id.semester)
        .bind(id.year)
        .bind(id.class_number as i64)
        .bind(seats.status.as_str())
        .bind(seats.seats_available as i32)
        .bind(seats.waitlist_available as i32)
        .bind(seats.reserved.map(|r| r.available as i32))
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(sections.len() as u64)
}

/// Whether a snapshot was already captured today (local date).
///
/// An empty sink yields false, so a first run always proceeds.
pub async fn was_collected_today(pool: &PgPool) -> Result<bool> {
    let latest: Option<chrono::DateTime<Utc>> =
        sqlx::query_scalar("SELECT MAX(retrieved_at) FROM section_snapshots")
            .fetch_one(pool)
            .await?;
    Ok(latest.is_some_and(|ts| {
        ts.with_timezone(&Local).date_naive() == Local::now().date_naive()
    }))
}
