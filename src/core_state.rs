//! Host-facing application state.
//!
//! `CoreState` owns the loaded journal, the custom vocabulary and the rule
//! tables. Hosts wrap it in `Arc` and call it from any thread; the journal
//! sits behind an `RwLock` so a submission's merge is never observed half
//! done.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use rusqlite::Connection;

use crate::config;
use crate::db::{self, DatabaseError};
use crate::intelligence::{RuleError, RuleTables};
use crate::journal::{self, JournalError, JournalStore, Submission};
use crate::models::{DayEntry, EntryDraft, TermKind};
use crate::vocabulary::{CustomVocabulary, VocabularyError};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    journal: RwLock<JournalStore>,
    vocabulary: RwLock<CustomVocabulary>,
    rules: RuleTables,
    /// `None` keeps everything in memory.
    db_path: Option<PathBuf>,
}

impl CoreState {
    /// Open the journal database at `db_path` and load rule overrides from
    /// `rules_dir` when present.
    pub fn open(db_path: &Path, rules_dir: &Path) -> Result<Self, CoreError> {
        let conn = db::open_database(db_path)?;
        let journal = db::load_journal(&conn)?;
        let vocabulary = db::load_custom_vocabulary(&conn)?;
        let rules = RuleTables::load_or_builtin(rules_dir)?;

        for symptom in rules.unknown_symptoms(&vocabulary) {
            tracing::warn!(symptom, "Rule can never fire: symptom not in vocabulary");
        }
        tracing::info!(
            entries = journal.len(),
            custom_terms = vocabulary.symptoms.len() + vocabulary.needs.len(),
            db = %db_path.display(),
            "Journal loaded"
        );

        Ok(Self {
            journal: RwLock::new(journal),
            vocabulary: RwLock::new(vocabulary),
            rules,
            db_path: Some(db_path.to_path_buf()),
        })
    }

    /// Open at the default locations under the app data directory.
    pub fn open_default() -> Result<Self, CoreError> {
        Self::open(&config::journal_db_path(), &config::rules_dir())
    }

    /// Unpersisted state with the built-in rule tables.
    pub fn in_memory() -> Self {
        Self::in_memory_with_rules(RuleTables::builtin().clone())
    }

    pub fn in_memory_with_rules(rules: RuleTables) -> Self {
        Self {
            journal: RwLock::new(JournalStore::new()),
            vocabulary: RwLock::new(CustomVocabulary::new()),
            rules,
            db_path: None,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.db_path.is_some()
    }

    pub fn rules(&self) -> &RuleTables {
        &self.rules
    }

    fn open_db(&self) -> Result<Option<Connection>, CoreError> {
        self.db_path
            .as_deref()
            .map(db::open_database)
            .transpose()
            .map_err(CoreError::Database)
    }

    // ── Journal ─────────────────────────────────────────────

    /// Acquire a read lock on the journal.
    pub fn read_journal(&self) -> Result<RwLockReadGuard<'_, JournalStore>, CoreError> {
        self.journal.read().map_err(|_| CoreError::LockPoisoned)
    }

    /// Parse a form draft and submit it.
    pub fn submit_draft(&self, draft: EntryDraft) -> Result<Submission, CoreError> {
        let entry = draft.into_entry(chrono::Local::now().naive_local())?;
        self.submit(entry)
    }

    /// Persist the entry, then merge and evaluate, all under the write lock.
    ///
    /// The disk write comes first so a failed save leaves the in-memory
    /// journal unchanged. Holding the lock through it keeps on-disk order
    /// equal to merge order.
    pub fn submit(&self, entry: DayEntry) -> Result<Submission, CoreError> {
        let mut journal = self.journal.write().map_err(|_| CoreError::LockPoisoned)?;
        if !entry.carries_signal() {
            return Err(JournalError::EmptyEntry.into());
        }

        if let Some(conn) = self.open_db()? {
            db::save_entry(&conn, &entry)?;
        }
        Ok(journal::submit(&mut journal, entry, &self.rules)?)
    }

    /// Newest-first copies of the last `n` entries.
    pub fn recent_entries(&self, n: usize) -> Result<Vec<DayEntry>, CoreError> {
        let journal = self.read_journal()?;
        Ok(journal.recent(n).into_iter().cloned().collect())
    }

    /// Wipe the journal in memory and on disk. Returns the number of entries
    /// removed.
    pub fn clear_all(&self) -> Result<usize, CoreError> {
        let mut journal = self.journal.write().map_err(|_| CoreError::LockPoisoned)?;
        let removed = journal.len();

        if let Some(conn) = self.open_db()? {
            db::clear_journal(&conn)?;
        }
        journal.clear();

        tracing::info!(removed, "Journal cleared");
        Ok(removed)
    }

    // ── Custom vocabulary ───────────────────────────────────

    pub fn vocabulary(&self) -> Result<CustomVocabulary, CoreError> {
        let vocab = self.vocabulary.read().map_err(|_| CoreError::LockPoisoned)?;
        Ok(vocab.clone())
    }

    /// Add a custom term and persist the vocabulary. Returns the stored form.
    pub fn add_custom_term(&self, kind: TermKind, raw: &str) -> Result<String, CoreError> {
        let mut vocab = self.vocabulary.write().map_err(|_| CoreError::LockPoisoned)?;
        let mut updated = vocab.clone();
        let term = match kind {
            TermKind::Symptom => updated.add_symptom(raw)?,
            TermKind::Need => updated.add_need(raw)?,
        };
        self.persist_vocabulary(&updated)?;
        *vocab = updated;

        tracing::debug!(kind = kind.as_str(), "Custom term added");
        Ok(term)
    }

    /// Remove a custom term. Returns whether it existed.
    pub fn remove_custom_term(&self, kind: TermKind, term: &str) -> Result<bool, CoreError> {
        let mut vocab = self.vocabulary.write().map_err(|_| CoreError::LockPoisoned)?;
        let mut updated = vocab.clone();
        let removed = match kind {
            TermKind::Symptom => updated.remove_symptom(term),
            TermKind::Need => updated.remove_need(term),
        };
        if removed {
            self.persist_vocabulary(&updated)?;
            *vocab = updated;
        }
        Ok(removed)
    }

    fn persist_vocabulary(&self, vocab: &CustomVocabulary) -> Result<(), CoreError> {
        if let Some(conn) = self.open_db()? {
            db::save_custom_vocabulary(&conn, vocab)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Journal(#[from] JournalError),
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
    #[error("Rule table error: {0}")]
    Rules(#[from] RuleError),
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::RedFlagAction;

    fn draft(date: &str, symptoms: &[&str]) -> EntryDraft {
        EntryDraft {
            date: date.into(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn in_memory_state_is_empty() {
        let state = CoreState::in_memory();
        assert!(!state.is_persistent());
        assert!(state.read_journal().unwrap().is_empty());
        assert!(state.vocabulary().unwrap().is_empty());
        assert_eq!(state.rules(), RuleTables::builtin());
    }

    #[test]
    fn submit_draft_merges_then_evaluates() {
        let state = CoreState::in_memory();
        state.submit_draft(draft("2024-03-09", &["便秘"])).unwrap();
        let second = state.submit_draft(draft("2024-03-10", &["便秘"])).unwrap();

        assert_eq!(state.read_journal().unwrap().len(), 2);
        assert!(second
            .advice
            .iter()
            .any(|a| a.key == "traditional_care:便秘"));
    }

    #[test]
    fn chest_pain_draft_raises_immediate_flag() {
        let state = CoreState::in_memory();
        let result = state
            .submit_draft(draft("2024-03-10", &["胸痛", "頭痛"]))
            .unwrap();

        assert_eq!(result.red_flags.len(), 1);
        assert_eq!(result.red_flags[0].rule.action, RedFlagAction::SeekCareImmediately);
    }

    #[test]
    fn empty_draft_leaves_journal_untouched() {
        let state = CoreState::in_memory();
        state.submit_draft(draft("2024-03-09", &["咳嗽"])).unwrap();

        let err = state.submit_draft(draft("2024-03-10", &[])).unwrap_err();
        assert!(matches!(err, CoreError::Journal(JournalError::EmptyEntry)));
        assert_eq!(state.read_journal().unwrap().len(), 1);
    }

    #[test]
    fn malformed_date_is_rejected() {
        let state = CoreState::in_memory();
        let err = state.submit_draft(draft("2024/03/10", &["咳嗽"])).unwrap_err();
        assert!(matches!(err, CoreError::Journal(JournalError::InvalidDate(_))));
    }

    #[test]
    fn recent_entries_newest_first() {
        let state = CoreState::in_memory();
        for date in ["2024-03-08", "2024-03-10", "2024-03-09"] {
            state.submit_draft(draft(date, &["咳嗽"])).unwrap();
        }
        let recent = state.recent_entries(2).unwrap();
        let dates: Vec<String> = recent.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-10", "2024-03-09"]);
    }

    #[test]
    fn concurrent_submissions_all_land() {
        let state = Arc::new(CoreState::in_memory());
        let handles: Vec<_> = (1..=8)
            .map(|day| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    let date = format!("2024-03-{day:02}");
                    state.submit_draft(draft(&date, &["咳嗽"])).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(state.read_journal().unwrap().len(), 8);
    }

    #[test]
    fn custom_terms_in_memory() {
        let state = CoreState::in_memory();
        assert_eq!(state.add_custom_term(TermKind::Symptom, " 耳鳴 ").unwrap(), "耳鳴");
        assert!(matches!(
            state.add_custom_term(TermKind::Symptom, "耳鳴"),
            Err(CoreError::Vocabulary(VocabularyError::Duplicate { .. }))
        ));
        assert!(state.remove_custom_term(TermKind::Symptom, "耳鳴").unwrap());
        assert!(!state.remove_custom_term(TermKind::Symptom, "耳鳴").unwrap());
    }

    // ── persistence ─────────────────────────────────────────

    #[test]
    fn journal_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("journal.db");
        let rules_dir = dir.path().join("rules");

        {
            let state = CoreState::open(&db_path, &rules_dir).unwrap();
            assert!(state.is_persistent());
            state.submit_draft(draft("2024-03-09", &["便秘"])).unwrap();
            state.add_custom_term(TermKind::Need, "冥想").unwrap();
        }

        let state = CoreState::open(&db_path, &rules_dir).unwrap();
        assert_eq!(state.read_journal().unwrap().len(), 1);
        assert_eq!(state.vocabulary().unwrap().needs, vec!["冥想".to_string()]);

        // Yesterday's reloaded entry still counts toward today's streak.
        let result = state.submit_draft(draft("2024-03-10", &["便秘"])).unwrap();
        assert!(result.advice.iter().any(|a| a.key == "traditional_care:便秘"));
    }

    #[test]
    fn resubmitted_date_replaces_row_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("journal.db");
        let state = CoreState::open(&db_path, dir.path()).unwrap();

        state.submit_draft(draft("2024-03-10", &["頭痛"])).unwrap();
        let second = state.submit_draft(draft("2024-03-10", &["咳嗽"])).unwrap();
        assert!(second.replaced);

        let conn = db::open_database(&db_path).unwrap();
        assert_eq!(db::count_entries(&conn).unwrap(), 1);
    }

    /// Swap the database file for a directory so every later open fails.
    fn break_database(db_path: &Path) {
        std::fs::remove_file(db_path).unwrap();
        std::fs::create_dir(db_path).unwrap();
    }

    #[test]
    fn failed_save_leaves_journal_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("journal.db");
        let state = CoreState::open(&db_path, dir.path()).unwrap();
        state.submit_draft(draft("2024-03-09", &["便秘"])).unwrap();

        break_database(&db_path);
        let err = state.submit_draft(draft("2024-03-10", &["便秘"])).unwrap_err();
        assert!(matches!(err, CoreError::Database(_)));

        let journal = state.read_journal().unwrap();
        assert_eq!(journal.len(), 1);
        let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(journal.get(today).is_none());
    }

    #[test]
    fn failed_save_keeps_replaced_entry() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("journal.db");
        let state = CoreState::open(&db_path, dir.path()).unwrap();
        state.submit_draft(draft("2024-03-10", &["頭痛"])).unwrap();

        break_database(&db_path);
        assert!(state.submit_draft(draft("2024-03-10", &["咳嗽"])).is_err());

        let entry = state.recent_entries(1).unwrap().remove(0);
        assert!(entry.has_symptom("頭痛"));
        assert!(!entry.has_symptom("咳嗽"));
    }

    #[test]
    fn failed_save_keeps_vocabulary_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("journal.db");
        let state = CoreState::open(&db_path, dir.path()).unwrap();
        state.add_custom_term(TermKind::Symptom, "耳鳴").unwrap();

        break_database(&db_path);
        assert!(state.add_custom_term(TermKind::Need, "冥想").is_err());
        assert!(state.remove_custom_term(TermKind::Symptom, "耳鳴").is_err());

        let vocab = state.vocabulary().unwrap();
        assert_eq!(vocab.symptoms, vec!["耳鳴".to_string()]);
        assert!(vocab.needs.is_empty());
    }

    #[test]
    fn clear_all_wipes_memory_and_disk() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("journal.db");
        let state = CoreState::open(&db_path, dir.path()).unwrap();
        state.submit_draft(draft("2024-03-09", &["咳嗽"])).unwrap();
        state.submit_draft(draft("2024-03-10", &["咳嗽"])).unwrap();

        assert_eq!(state.clear_all().unwrap(), 2);
        assert!(state.read_journal().unwrap().is_empty());

        let reopened = CoreState::open(&db_path, dir.path()).unwrap();
        assert!(reopened.read_journal().unwrap().is_empty());
    }

    #[test]
    fn rule_overrides_loaded_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("advice_rules.json"),
            r#"[{"trigger_symptom":"咳嗽","category":"lifestyle","content":"多休息","priority":10}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("red_flag_rules.json"), "[]").unwrap();

        let state = CoreState::open(&dir.path().join("journal.db"), dir.path()).unwrap();
        let result = state.submit_draft(draft("2024-03-10", &["咳嗽"])).unwrap();

        assert_eq!(result.advice.len(), 1);
        assert_eq!(result.advice[0].content, "多休息");
        assert!(result.red_flags.is_empty());
    }

    #[test]
    fn broken_rule_file_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("advice_rules.json"), "{ nope").unwrap();

        let result = CoreState::open(&dir.path().join("journal.db"), dir.path());
        assert!(matches!(result, Err(CoreError::Rules(_))));
    }
}
