use std::sync::Arc;

use tracing::debug;

use crate::error::CorpusError;
use prep_core::model::{BankDomain, Corpus};
use prep_core::parser;
use storage::repository::StateRepository;

/// Imports and serves the question corpus for one bank domain.
///
/// The raw blob is the source of truth; it is persisted as-is and re-parsed
/// on load, so improving the parser retroactively improves old imports.
#[derive(Clone)]
pub struct CorpusService {
    domain: BankDomain,
    state: Arc<dyn StateRepository>,
}

impl CorpusService {
    #[must_use]
    pub fn new(domain: BankDomain, state: Arc<dyn StateRepository>) -> Self {
        Self { domain, state }
    }

    fn corpus_key(&self) -> String {
        format!("{}corpus", self.domain.storage_prefix())
    }

    /// Parse a raw blob, persist it, and return the parsed corpus.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::Storage` if the blob cannot be persisted; the
    /// parse itself never fails.
    pub async fn import(&self, raw: &str) -> Result<Corpus, CorpusError> {
        let corpus = parser::parse(raw);
        self.state.put(&self.corpus_key(), raw).await?;
        debug!(
            domain = %self.domain,
            companies = corpus.companies.len(),
            questions = corpus.question_count(),
            "imported corpus"
        );
        Ok(corpus)
    }

    /// Load and parse the previously imported corpus.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::Missing` if nothing has been imported, or
    /// `CorpusError::Storage` if the read fails.
    pub async fn load(&self) -> Result<Corpus, CorpusError> {
        let raw = self
            .state
            .get(&self.corpus_key())
            .await?
            .ok_or(CorpusError::Missing)?;
        Ok(parser::parse(&raw))
    }

    /// Company names available for scope selection, in corpus order.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`load`](Self::load).
    pub async fn company_names(&self) -> Result<Vec<String>, CorpusError> {
        let corpus = self.load().await?;
        Ok(corpus.company_names().map(str::to_owned).collect())
    }
}
