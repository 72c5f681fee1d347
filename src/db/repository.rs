use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};

use super::DatabaseError;
use crate::journal::JournalStore;
use crate::models::{DayEntry, TermKind, Vitals};
use crate::vocabulary::CustomVocabulary;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ═══════════════════════════════════════════
// Day-entry Repository
// ═══════════════════════════════════════════

/// Insert or replace the row for `entry.date`.
pub fn save_entry(conn: &Connection, entry: &DayEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR REPLACE INTO day_entries (date, symptoms, needs, mood, note, photos,
         bp_sys, bp_dia, heart_rate, weight, steps, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            entry.date.format(DATE_FORMAT).to_string(),
            serde_json::to_string(&entry.symptoms)?,
            serde_json::to_string(&entry.needs)?,
            entry.mood as i32,
            entry.note,
            serde_json::to_string(&entry.photos)?,
            entry.vitals.bp_sys,
            entry.vitals.bp_dia,
            entry.vitals.heart_rate,
            entry.vitals.weight,
            entry.vitals.steps,
            entry.created_at.format(DATETIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Load every stored entry into a fresh store.
pub fn load_journal(conn: &Connection) -> Result<JournalStore, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT date, symptoms, needs, mood, note, photos,
                bp_sys, bp_dia, heart_rate, weight, steps, created_at
         FROM day_entries ORDER BY date ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(DayEntryRow {
            date: row.get(0)?,
            symptoms: row.get(1)?,
            needs: row.get(2)?,
            mood: row.get(3)?,
            note: row.get(4)?,
            photos: row.get(5)?,
            bp_sys: row.get(6)?,
            bp_dia: row.get(7)?,
            heart_rate: row.get(8)?,
            weight: row.get(9)?,
            steps: row.get(10)?,
            created_at: row.get(11)?,
        })
    })?;

    let mut store = JournalStore::new();
    for row in rows {
        store.upsert(entry_from_row(row?)?);
    }
    Ok(store)
}

/// Deletes every entry. Returns the number removed.
pub fn clear_journal(conn: &Connection) -> Result<usize, DatabaseError> {
    Ok(conn.execute("DELETE FROM day_entries", [])?)
}

pub fn count_entries(conn: &Connection) -> Result<i64, DatabaseError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM day_entries", [], |r| r.get(0))?)
}

struct DayEntryRow {
    date: String,
    symptoms: String,
    needs: String,
    mood: i32,
    note: String,
    photos: String,
    bp_sys: Option<f64>,
    bp_dia: Option<f64>,
    heart_rate: Option<f64>,
    weight: Option<f64>,
    steps: Option<f64>,
    created_at: String,
}

fn entry_from_row(row: DayEntryRow) -> Result<DayEntry, DatabaseError> {
    let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
        .map_err(|_| DatabaseError::InvalidDate(row.date.clone()))?;
    let symptoms: BTreeSet<String> = serde_json::from_str(&row.symptoms)?;
    let needs: BTreeSet<String> = serde_json::from_str(&row.needs)?;
    let photos: Vec<String> = serde_json::from_str(&row.photos)?;
    let mood = u8::try_from(row.mood).map_err(|_| DatabaseError::InvalidField {
        field: "mood".into(),
        value: row.mood.to_string(),
    })?;
    let created_at = NaiveDateTime::parse_from_str(&row.created_at, DATETIME_FORMAT)
        .map_err(|_| DatabaseError::InvalidDate(row.created_at.clone()))?;

    Ok(DayEntry {
        date,
        symptoms,
        needs,
        mood,
        note: row.note,
        photos,
        vitals: Vitals {
            bp_sys: row.bp_sys,
            bp_dia: row.bp_dia,
            heart_rate: row.heart_rate,
            weight: row.weight,
            steps: row.steps,
        },
        created_at,
    })
}

// ═══════════════════════════════════════════
// Custom vocabulary Repository
// ═══════════════════════════════════════════

/// Replace the stored custom vocabulary with `vocab`.
pub fn save_custom_vocabulary(
    conn: &Connection,
    vocab: &CustomVocabulary,
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM custom_terms", [])?;

    for (kind, terms) in [
        (TermKind::Symptom, &vocab.symptoms),
        (TermKind::Need, &vocab.needs),
    ] {
        for (position, term) in terms.iter().enumerate() {
            tx.execute(
                "INSERT INTO custom_terms (kind, term, position) VALUES (?1, ?2, ?3)",
                params![kind.as_str(), term, position as i64],
            )?;
        }
    }

    tx.commit()?;
    Ok(())
}

pub fn load_custom_vocabulary(conn: &Connection) -> Result<CustomVocabulary, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT kind, term FROM custom_terms ORDER BY kind, position ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut vocab = CustomVocabulary::new();
    for row in rows {
        let (kind, term) = row?;
        match TermKind::from_str(&kind)? {
            TermKind::Symptom => vocab.symptoms.push(term),
            TermKind::Need => vocab.needs.push(term),
        }
    }
    Ok(vocab)
}
