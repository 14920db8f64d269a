use std::sync::Arc;

use serde_json::Value;
use shared::protocol::Outcome;
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub mod cache;
pub mod error;
pub mod operations;
pub mod pages;
pub mod progress;
pub mod routes;
pub mod session;
pub mod timer;
pub mod transport;

pub use cache::{FetchPolicy, NormalizedCache};
pub use error::{QuizError, TransportError};
pub use operations::Operation;
pub use pages::PageContext;
pub use routes::Route;
pub use session::{SessionStore, StoredSession};
pub use transport::{GraphQlRequest, GraphQlTransport, HttpTransport, MissingTransport};

/// GraphQL client shared by every page: one transport plus the normalized
/// cache it fills.
pub struct LearningClient {
    transport: Arc<dyn GraphQlTransport>,
    cache: RwLock<NormalizedCache>,
}

impl LearningClient {
    pub fn new(transport: Arc<dyn GraphQlTransport>) -> Arc<Self> {
        Arc::new(Self {
            transport,
            cache: RwLock::new(NormalizedCache::new()),
        })
    }

    pub fn offline() -> Arc<Self> {
        Self::new(Arc::new(MissingTransport))
    }

    pub async fn set_auth_token(&self, token: Option<String>) {
        self.transport.set_auth_token(token).await;
    }

    pub async fn query<O: Operation>(
        &self,
        variables: &O::Variables,
        policy: FetchPolicy,
    ) -> Result<O::Output, TransportError> {
        let variables = encode_variables::<O>(variables)?;

        if policy == FetchPolicy::CacheFirst {
            let cached = self.cache.read().await.read(O::ROOT_FIELD, &variables);
            if let Some(cached) = cached {
                match decode::<O>(cached) {
                    Ok(output) => {
                        debug!(operation = O::NAME, "served from cache");
                        return Ok(output);
                    }
                    Err(err) => {
                        warn!(operation = O::NAME, error = %err, "cached result unreadable; refetching");
                    }
                }
            }
        }

        let root = self.fetch::<O>(variables.clone()).await?;
        if policy != FetchPolicy::NoCache {
            self.cache
                .write()
                .await
                .write(O::ROOT_FIELD, &variables, root.clone());
        }
        decode::<O>(root)
    }

    /// Runs a mutation. Entities in the result are merged into the cache;
    /// root fields affected by the change must be evicted by the caller.
    pub async fn mutate<O: Operation>(
        &self,
        variables: &O::Variables,
    ) -> Result<O::Output, TransportError> {
        let variables = encode_variables::<O>(variables)?;
        let root = self.fetch::<O>(variables).await?;
        self.cache.write().await.write_entities(root.clone());
        decode::<O>(root)
    }

    pub async fn evict_fields(&self, fields: &[&str]) -> usize {
        let mut cache = self.cache.write().await;
        fields.iter().map(|field| cache.evict_field(field)).sum()
    }

    pub async fn evict_entity(&self, id: &str) -> bool {
        self.cache.write().await.evict_entity(id)
    }

    pub async fn gc(&self) -> usize {
        self.cache.write().await.gc()
    }

    pub async fn reset_cache(&self) {
        self.cache.write().await.clear();
    }

    pub async fn cached_root(&self, field: &str, variables: &Value) -> Option<Value> {
        self.cache.read().await.read(field, variables)
    }

    async fn fetch<O: Operation>(&self, variables: Value) -> Result<Value, TransportError> {
        debug!(operation = O::NAME, kind = ?O::KIND, "executing operation");
        let request = GraphQlRequest {
            query: O::DOCUMENT.to_string(),
            operation_name: O::NAME.to_string(),
            variables,
        };
        let mut data = self.transport.execute(request).await?;
        match data.get_mut(O::ROOT_FIELD).map(Value::take) {
            None | Some(Value::Null) => Err(TransportError::EmptyResult(O::ROOT_FIELD)),
            Some(root) => Ok(root),
        }
    }
}

fn encode_variables<O: Operation>(variables: &O::Variables) -> Result<Value, TransportError> {
    serde_json::to_value(variables).map_err(|source| TransportError::Decode {
        field: O::ROOT_FIELD,
        source,
    })
}

fn decode<O: Operation>(root: Value) -> Result<O::Output, TransportError> {
    let output: O::Output = serde_json::from_value(root).map_err(|source| TransportError::Decode {
        field: O::ROOT_FIELD,
        source,
    })?;
    if let Some(err) = output.api_error() {
        debug!(
            operation = O::NAME,
            code = ?err.code,
            message = %err.message,
            "api returned an error variant"
        );
    }
    Ok(output)
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
