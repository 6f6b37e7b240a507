use std::sync::Arc;

use crate::config::Config;
use crate::embedding::pool::EmbeddingPool;
use crate::parsing::vocabulary::Vocabulary;
use crate::store::MatchStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Postgres in production, in-memory when `DATABASE_URL` is unset.
    pub store: Arc<dyn MatchStore>,
    pub embeddings: EmbeddingPool,
    pub vocabulary: Arc<Vocabulary>,
}

#[cfg(test)]
impl AppState {
    /// In-memory store, default vocabulary and the given provider.
    pub(crate) fn for_tests(
        provider: Arc<dyn crate::embedding::VectorProvider>,
        degraded_mode: bool,
    ) -> Self {
        use std::time::Duration;

        let config = Config {
            embedding_dimension: provider.dimension(),
            embedding_degraded_mode: degraded_mode,
            ..Config::default()
        };
        let embeddings = EmbeddingPool::new(provider, 4, Duration::from_secs(5), degraded_mode);

        AppState {
            config,
            store: Arc::new(crate::store::MemoryMatchStore::new()),
            embeddings,
            vocabulary: Arc::new(Vocabulary::default()),
        }
    }
}
