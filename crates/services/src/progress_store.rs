use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use prep_core::model::{BankDomain, Question, QuestionId};
use prep_core::progress::{self, TopicProgress};
use storage::repository::StateRepository;

const COMPLETED: &str = "completed";
const BOOKMARKS: &str = "bookmarks";
const NOTES: &str = "notes";
const OPEN_TOPICS: &str = "openTopics";
const SELECTED: &str = "selected";

/// Write-through progress store for one bank domain.
///
/// Holds the four pieces of state for the currently selected scope (a
/// company for the DSA tracker, a subject or `global` for the flat banks):
/// completion flags, bookmarks, notes, and the set of expanded topics. Every
/// mutation persists the whole updated piece before returning. Persistence
/// failures are logged and swallowed; the in-memory state stays usable and
/// the write is simply lost. Switching scope discards in-memory state (it is
/// already durable) and loads the new scope's entries, treating missing or
/// malformed stored data as empty.
pub struct ProgressStore {
    domain: BankDomain,
    scope: Option<String>,
    completed: HashMap<QuestionId, bool>,
    bookmarked: HashMap<QuestionId, bool>,
    notes: HashMap<QuestionId, String>,
    open_topics: BTreeSet<String>,
    state: Arc<dyn StateRepository>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(domain: BankDomain, state: Arc<dyn StateRepository>) -> Self {
        Self {
            domain,
            scope: None,
            completed: HashMap::new(),
            bookmarked: HashMap::new(),
            notes: HashMap::new(),
            open_topics: BTreeSet::new(),
            state,
        }
    }

    #[must_use]
    pub fn domain(&self) -> BankDomain {
        self.domain
    }

    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    fn entry_key(&self, piece: &str, scope: &str) -> String {
        format!("{}{piece}:{scope}", self.domain.storage_prefix())
    }

    fn selected_key(&self) -> String {
        format!("{}{SELECTED}", self.domain.storage_prefix())
    }

    /// Select a scope and load its persisted state.
    ///
    /// The previous scope's in-memory state is discarded; it was persisted
    /// write-through on every mutation. The selection itself is persisted so
    /// the next session can restore it.
    pub async fn select_scope(&mut self, scope: &str) {
        debug!(domain = %self.domain, scope, "loading tracker scope");
        self.completed = self.load_entry(COMPLETED, scope).await;
        self.bookmarked = self.load_entry(BOOKMARKS, scope).await;
        self.notes = self.load_entry(NOTES, scope).await;
        self.open_topics = self.load_entry(OPEN_TOPICS, scope).await;
        self.scope = Some(scope.to_owned());

        let key = self.selected_key();
        self.write(&key, &scope).await;
    }

    /// The scope persisted by the last `select_scope`, if any.
    pub async fn last_selected_scope(&self) -> Option<String> {
        match self.state.get(&self.selected_key()).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(err) => {
                warn!(domain = %self.domain, %err, "failed to read selected scope");
                None
            }
        }
    }

    /// Flip the completion flag for a question; absent counts as `false`.
    ///
    /// Returns the new value. The updated map is persisted before returning.
    pub async fn toggle_completed(&mut self, id: &QuestionId) -> bool {
        let flipped = !self.completed.get(id).copied().unwrap_or(false);
        self.completed.insert(id.clone(), flipped);
        self.persist_piece(COMPLETED).await;
        flipped
    }

    /// Flip the bookmark flag for a question; absent counts as `false`.
    pub async fn toggle_bookmarked(&mut self, id: &QuestionId) -> bool {
        let flipped = !self.bookmarked.get(id).copied().unwrap_or(false);
        self.bookmarked.insert(id.clone(), flipped);
        self.persist_piece(BOOKMARKS).await;
        flipped
    }

    /// Replace the note for a question.
    pub async fn set_note(&mut self, id: &QuestionId, text: &str) {
        self.notes.insert(id.clone(), text.to_owned());
        self.persist_piece(NOTES).await;
    }

    /// Toggle a topic's expanded/collapsed state.
    ///
    /// Returns `true` when the topic is now open.
    pub async fn toggle_topic_open(&mut self, topic: &str) -> bool {
        let now_open = if self.open_topics.remove(topic) {
            false
        } else {
            self.open_topics.insert(topic.to_owned());
            true
        };
        self.persist_piece(OPEN_TOPICS).await;
        now_open
    }

    #[must_use]
    pub fn is_completed(&self, id: &QuestionId) -> bool {
        self.completed.get(id).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn is_bookmarked(&self, id: &QuestionId) -> bool {
        self.bookmarked.get(id).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn note(&self, id: &QuestionId) -> Option<&str> {
        self.notes.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn is_topic_open(&self, topic: &str) -> bool {
        self.open_topics.contains(topic)
    }

    #[must_use]
    pub fn completed(&self) -> &HashMap<QuestionId, bool> {
        &self.completed
    }

    #[must_use]
    pub fn bookmarked(&self) -> &HashMap<QuestionId, bool> {
        &self.bookmarked
    }

    /// Derived completion statistic for one topic's question list.
    ///
    /// Recomputed on every call; the completed map changes independently of
    /// the question list.
    #[must_use]
    pub fn topic_progress(&self, questions: &[Question]) -> TopicProgress {
        progress::topic_progress(questions, &self.completed)
    }

    async fn load_entry<T>(&self, piece: &str, scope: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let key = self.entry_key(piece, scope);
        match self.state.get(&key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(%key, %err, "malformed persisted state, starting empty");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(err) => {
                warn!(%key, %err, "failed to read persisted state, starting empty");
                T::default()
            }
        }
    }

    async fn persist_piece(&self, piece: &str) {
        let Some(scope) = self.scope.clone() else {
            return;
        };
        let key = self.entry_key(piece, &scope);
        match piece {
            COMPLETED => self.write(&key, &self.completed).await,
            BOOKMARKS => self.write(&key, &self.bookmarked).await,
            NOTES => self.write(&key, &self.notes).await,
            OPEN_TOPICS => self.write(&key, &self.open_topics).await,
            _ => {}
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(%key, %err, "failed to encode state for persistence");
                return;
            }
        };
        if let Err(err) = self.state.put(key, &encoded).await {
            warn!(%key, %err, "state write lost; continuing with in-memory state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use storage::repository::{InMemoryRepository, StorageError};

    fn store(repo: &InMemoryRepository) -> ProgressStore {
        ProgressStore::new(BankDomain::Dsa, Arc::new(repo.clone()))
    }

    fn id(title: &str) -> QuestionId {
        QuestionId::compose("INFOSYS (SP & DSE)", "ARRAYS", title)
    }

    #[tokio::test]
    async fn toggle_completed_flips_and_persists() {
        let repo = InMemoryRepository::new();
        let mut tracker = store(&repo);
        tracker.select_scope("INFOSYS (SP & DSE)").await;

        assert!(tracker.toggle_completed(&id("Two Sum")).await);
        assert!(tracker.is_completed(&id("Two Sum")));

        let raw = repo
            .get("prep:dsa:completed:INFOSYS (SP & DSE)")
            .await
            .unwrap()
            .expect("entry persisted");
        assert!(raw.contains("INFOSYS (SP & DSE)|ARRAYS|Two Sum"));
        assert!(raw.contains("true"));
    }

    #[tokio::test]
    async fn double_bookmark_toggle_restores_unset_state() {
        let repo = InMemoryRepository::new();
        let mut tracker = store(&repo);
        tracker.select_scope("INFOSYS (SP & DSE)").await;

        let target = id("Two Sum");
        assert!(tracker.toggle_bookmarked(&target).await);
        assert!(!tracker.toggle_bookmarked(&target).await);

        assert!(!tracker.is_bookmarked(&target));
        // no other id was touched
        assert!(!tracker.is_bookmarked(&id("Rotate Array")));
        assert_eq!(tracker.bookmarked().len(), 1);
    }

    #[tokio::test]
    async fn state_survives_a_fresh_store_instance() {
        let repo = InMemoryRepository::new();
        {
            let mut tracker = store(&repo);
            tracker.select_scope("WIPRO").await;
            tracker
                .toggle_completed(&QuestionId::compose("WIPRO", "ARRAYS", "Kadane"))
                .await;
            tracker
                .set_note(&QuestionId::compose("WIPRO", "ARRAYS", "Kadane"), "sliding window")
                .await;
            tracker.toggle_topic_open("ARRAYS").await;
        }

        let mut tracker = store(&repo);
        assert_eq!(tracker.last_selected_scope().await.as_deref(), Some("WIPRO"));
        tracker.select_scope("WIPRO").await;
        let kadane = QuestionId::compose("WIPRO", "ARRAYS", "Kadane");
        assert!(tracker.is_completed(&kadane));
        assert_eq!(tracker.note(&kadane), Some("sliding window"));
        assert!(tracker.is_topic_open("ARRAYS"));
    }

    #[tokio::test]
    async fn switching_scope_discards_previous_state() {
        let repo = InMemoryRepository::new();
        let mut tracker = store(&repo);
        tracker.select_scope("WIPRO").await;
        tracker
            .toggle_completed(&QuestionId::compose("WIPRO", "ARRAYS", "Kadane"))
            .await;

        tracker.select_scope("TCS").await;
        assert!(tracker.completed().is_empty());
        assert_eq!(tracker.scope(), Some("TCS"));

        // and coming back reloads the durable state
        tracker.select_scope("WIPRO").await;
        assert!(tracker.is_completed(&QuestionId::compose("WIPRO", "ARRAYS", "Kadane")));
    }

    #[tokio::test]
    async fn malformed_persisted_state_loads_as_empty() {
        let repo = InMemoryRepository::new();
        repo.put("prep:dsa:completed:WIPRO", "not json at all")
            .await
            .unwrap();
        repo.put("prep:dsa:openTopics:WIPRO", "{\"wrong\":\"shape\"}")
            .await
            .unwrap();

        let mut tracker = store(&repo);
        tracker.select_scope("WIPRO").await;
        assert!(tracker.completed().is_empty());
        assert!(!tracker.is_topic_open("ARRAYS"));
    }

    #[tokio::test]
    async fn set_note_replaces_rather_than_appends() {
        let repo = InMemoryRepository::new();
        let mut tracker = store(&repo);
        tracker.select_scope("WIPRO").await;

        let target = QuestionId::compose("WIPRO", "ARRAYS", "Kadane");
        tracker.set_note(&target, "first draft").await;
        tracker.set_note(&target, "final").await;
        assert_eq!(tracker.note(&target), Some("final"));
    }

    #[tokio::test]
    async fn open_topics_persist_as_an_array() {
        let repo = InMemoryRepository::new();
        let mut tracker = store(&repo);
        tracker.select_scope("WIPRO").await;
        tracker.toggle_topic_open("ARRAYS").await;
        tracker.toggle_topic_open("STRINGS").await;

        let raw = repo
            .get("prep:dsa:openTopics:WIPRO")
            .await
            .unwrap()
            .expect("entry persisted");
        assert_eq!(raw, "[\"ARRAYS\",\"STRINGS\"]");
    }

    #[derive(Clone)]
    struct FailingRepository;

    #[async_trait]
    impl StateRepository for FailingRepository {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("storage unavailable".into()))
        }

        async fn put(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("quota exceeded".into()))
        }
    }

    #[tokio::test]
    async fn storage_failures_never_propagate() {
        let mut tracker = ProgressStore::new(BankDomain::Hr, Arc::new(FailingRepository));
        tracker.select_scope("global").await;

        let target = QuestionId::from_parts(&["HR", "Tell me about yourself"]);
        // writes are lost but the in-memory state keeps working
        assert!(tracker.toggle_completed(&target).await);
        assert!(tracker.is_completed(&target));
        tracker.set_note(&target, "STAR format").await;
        assert_eq!(tracker.note(&target), Some("STAR format"));
    }
}
