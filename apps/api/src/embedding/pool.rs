//! Bounded-concurrency front door to the `VectorProvider`.
//!
//! Batches fan out on a `JoinSet` and fan back in by index, so result order
//! always matches input order regardless of completion order. Dropping a
//! pending batch drops its `JoinSet`, which aborts every outstanding call.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::{Embedding, EmbeddingError, VectorProvider};

#[derive(Clone)]
pub struct EmbeddingPool {
    provider: Arc<dyn VectorProvider>,
    permits: Arc<Semaphore>,
    timeout: Duration,
    degraded_mode: bool,
}

impl EmbeddingPool {
    pub fn new(
        provider: Arc<dyn VectorProvider>,
        max_concurrency: usize,
        timeout: Duration,
        degraded_mode: bool,
    ) -> Self {
        Self {
            provider,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            timeout,
            degraded_mode,
        }
    }

    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn degraded_mode(&self) -> bool {
        self.degraded_mode
    }

    /// Embeds one text, never substituting a placeholder. Used for query
    /// vectors, which are meaningless as placeholders.
    pub async fn embed_strict(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| EmbeddingError::Cancelled)?;

        let values = tokio::time::timeout(self.timeout, self.provider.embed(text))
            .await
            .map_err(|_| EmbeddingError::Timeout(self.timeout))??;

        let expected = self.provider.dimension();
        if values.len() != expected {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: values.len(),
            });
        }

        Ok(Embedding::new(values))
    }

    /// Embeds one text. In degraded mode an unavailable provider yields a
    /// flagged zero vector instead of an error.
    pub async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        match self.embed_strict(text).await {
            Ok(embedding) => Ok(embedding),
            Err(e) if self.degraded_mode && e.is_unavailable() => {
                warn!("Embedding unavailable ({e}); substituting placeholder vector");
                Ok(Embedding::placeholder(self.dimension()))
            }
            Err(e) => Err(e),
        }
    }

    /// Embeds every text concurrently, at most `max_concurrency` in flight.
    /// One result per input, same order.
    pub async fn embed_batch(&self, texts: Vec<String>) -> Vec<Result<Embedding, EmbeddingError>> {
        let total = texts.len();
        let mut tasks = JoinSet::new();

        for (index, text) in texts.into_iter().enumerate() {
            let pool = self.clone();
            tasks.spawn(async move { (index, pool.embed(&text).await) });
        }

        let mut results: Vec<Option<Result<Embedding, EmbeddingError>>> =
            (0..total).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => warn!("Embedding task failed to complete: {e}"),
            }
        }

        debug!("Embedded batch of {total} texts");

        results
            .into_iter()
            .map(|r| r.unwrap_or(Err(EmbeddingError::Cancelled)))
            .collect()
    }
}
