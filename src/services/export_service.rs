use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::BookingQuery;

/// A booking joined with the people on it, flattened for export.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingExportRow {
    pub id: Uuid,
    pub coach_name: String,
    pub player_name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub location: String,
    pub status: String,
}

#[derive(Clone)]
pub struct ExportService {
    db: PgPool,
}

impl ExportService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn booking_export_rows(&self, query: &BookingQuery) -> Result<Vec<BookingExportRow>> {
        let mut sql = String::from(
            "SELECT b.id, \
                    u.first_name || ' ' || u.last_name AS coach_name, \
                    p.first_name || ' ' || p.last_name AS player_name, \
                    b.starts_at, b.ends_at, b.location, b.status \
             FROM bookings b \
             JOIN users u ON u.id = b.coach_id \
             JOIN players p ON p.id = b.player_id \
             WHERE 1=1",
        );
        let mut param_count = 1;

        if query.coach_id.is_some() {
            sql.push_str(&format!(" AND b.coach_id = ${param_count}"));
            param_count += 1;
        }
        if query.player_id.is_some() {
            sql.push_str(&format!(" AND b.player_id = ${param_count}"));
            param_count += 1;
        }
        if query.status.is_some() {
            sql.push_str(&format!(" AND b.status = ${param_count}"));
            param_count += 1;
        }
        if query.from.is_some() {
            sql.push_str(&format!(" AND b.starts_at >= ${param_count}"));
            param_count += 1;
        }
        if query.to.is_some() {
            sql.push_str(&format!(" AND b.starts_at < ${param_count}"));
        }

        sql.push_str(" ORDER BY b.starts_at");

        let mut query_builder = sqlx::query_as::<_, BookingExportRow>(&sql);
        if let Some(coach_id) = query.coach_id {
            query_builder = query_builder.bind(coach_id);
        }
        if let Some(player_id) = query.player_id {
            query_builder = query_builder.bind(player_id);
        }
        if let Some(status) = query.status {
            query_builder = query_builder.bind(status.as_str());
        }
        if let Some(from) = query.from {
            query_builder = query_builder.bind(from);
        }
        if let Some(to) = query.to {
            query_builder = query_builder.bind(to);
        }

        Ok(query_builder.fetch_all(&self.db).await?)
    }
}

/// Render bookings as CSV with a header row.
pub fn bookings_to_csv(rows: &[BookingExportRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "coach",
        "player",
        "starts_at",
        "ends_at",
        "location",
        "status",
    ])?;

    for row in rows {
        writer.write_record([
            row.id.to_string(),
            row.coach_name.clone(),
            row.player_name.clone(),
            row.starts_at.to_rfc3339(),
            row.ends_at.to_rfc3339(),
            row.location.clone(),
            row.status.clone(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Render bookings as a VCALENDAR. Plain text templating is enough for
/// the calendar apps we feed; this is not a general RFC 5545 writer.
pub fn bookings_to_ics(rows: &[BookingExportRow], generated_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Pitchside//Bookings//EN".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
    ];

    for row in rows {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}@pitchside", row.id));
        lines.push(format!("DTSTAMP:{}", ics_timestamp(generated_at)));
        lines.push(format!("DTSTART:{}", ics_timestamp(row.starts_at)));
        lines.push(format!("DTEND:{}", ics_timestamp(row.ends_at)));
        lines.push(format!(
            "SUMMARY:{}",
            escape_ics_text(&format!(
                "Training session: {} with {}",
                row.player_name, row.coach_name
            ))
        ));
        if !row.location.is_empty() {
            lines.push(format!("LOCATION:{}", escape_ics_text(&row.location)));
        }
        lines.push(format!("STATUS:{}", ics_status(&row.status)));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

fn ics_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

fn ics_status(status: &str) -> &'static str {
    match status {
        "cancelled" => "CANCELLED",
        "pending" => "TENTATIVE",
        _ => "CONFIRMED",
    }
}

fn escape_ics_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_row() -> BookingExportRow {
        BookingExportRow {
            id: Uuid::nil(),
            coach_name: "Coach Kim".to_string(),
            player_name: "Alex Doe".to_string(),
            starts_at: Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap(),
            location: "Field 2, North".to_string(),
            status: "confirmed".to_string(),
        }
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = bookings_to_csv(&[sample_row()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,coach,player,starts_at,ends_at,location,status"
        );
        let row = lines.next().unwrap();
        assert!(row.contains("Coach Kim"));
        assert!(row.contains("Alex Doe"));
    }

    #[test]
    fn ics_contains_event_fields() {
        let generated_at = Utc.with_ymd_and_hms(2025, 5, 30, 12, 0, 0).unwrap();
        let ics = bookings_to_ics(&[sample_row()], generated_at);
        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(ics.contains("DTSTART:20250601T100000Z"));
        assert!(ics.contains("DTEND:20250601T110000Z"));
        assert!(ics.contains("SUMMARY:Training session: Alex Doe with Coach Kim"));
        // Commas in free text are escaped.
        assert!(ics.contains("LOCATION:Field 2\\, North"));
        assert!(ics.trim_end().ends_with("END:VCALENDAR"));
    }
}
