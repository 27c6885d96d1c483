use std::sync::Arc;

use prep_core::Clock;
use prep_core::model::BankDomain;
use storage::repository::Storage;

use crate::corpus_service::CorpusService;
use crate::error::AppServicesError;
use crate::mentor_service::MentorService;
use crate::progress_store::ProgressStore;

/// Assembles app-facing services over a storage backend.
///
/// Everything is explicitly constructed and injected here; there is no
/// process-wide singleton, and dropping `AppServices` releases the whole
/// graph.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    storage: Storage,
    corpus: Arc<CorpusService>,
    mentor: Arc<MentorService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, clock))
    }

    /// Build services over in-memory storage, for tests and dry runs.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::with_storage(Storage::in_memory(), clock)
    }

    fn with_storage(storage: Storage, clock: Clock) -> Self {
        let corpus = Arc::new(CorpusService::new(
            BankDomain::Dsa,
            Arc::clone(&storage.state),
        ));
        let mentor = Arc::new(MentorService::from_env());
        Self {
            clock,
            storage,
            corpus,
            mentor,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn corpus(&self) -> Arc<CorpusService> {
        Arc::clone(&self.corpus)
    }

    #[must_use]
    pub fn mentor(&self) -> Arc<MentorService> {
        Arc::clone(&self.mentor)
    }

    /// A fresh progress store for the given domain.
    ///
    /// Stores are cheap; each view owns one and selects its own scope.
    #[must_use]
    pub fn progress(&self, domain: BankDomain) -> ProgressStore {
        ProgressStore::new(domain, Arc::clone(&self.storage.state))
    }
}
