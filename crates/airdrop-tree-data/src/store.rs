use backoff::future::retry;
use backoff::ExponentialBackoff;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::adapter::{load, VerifiedTree};
use crate::errors::{DataError, DataResult};
use airdrop_merkle::{hash_to_hex, Hash32, LeafEncoding};

/// Where published tree documents live: a directory, an object store, a
/// gateway. Implementations return the raw document text.
pub trait TreeStore {
    fn fetch(&self, location: &str) -> impl Future<Output = DataResult<String>> + Send;
}

/// Tree documents on the local filesystem, resolved relative to `root`.
#[derive(Debug, Clone)]
pub struct FileTreeStore {
    root: PathBuf,
}

impl FileTreeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        self.root.join(location)
    }
}

impl TreeStore for FileTreeStore {
    fn fetch(&self, location: &str) -> impl Future<Output = DataResult<String>> + Send {
        let path = self.resolve(location);
        async move {
            debug!("Reading tree document {}", path.display());
            Ok(tokio::fs::read_to_string(&path).await?)
        }
    }
}

/// Retry settings for fetching tree documents
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Backoff strategy for transient fetch failures
    pub retry_backoff: ExponentialBackoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_backoff: ExponentialBackoff {
                initial_interval: Duration::from_millis(250),
                max_interval: Duration::from_secs(10),
                max_elapsed_time: Some(Duration::from_secs(60)),
                multiplier: 2.0,
                ..Default::default()
            },
        }
    }
}

/// Fetch a tree document and verify it.
///
/// Transient store failures are retried with backoff. A document that fails
/// verification is returned as an error immediately: refetching the same bytes
/// cannot fix a root mismatch.
pub async fn fetch_verified_tree<S>(
    store: &S,
    location: &str,
    encoding: LeafEncoding,
    policy: &RetryPolicy,
) -> DataResult<VerifiedTree>
where
    S: TreeStore + Sync,
{
    let body = retry(policy.retry_backoff.clone(), move || async move {
        match store.fetch(location).await {
            Ok(body) => Ok(body),
            Err(e) if e.is_transient() => {
                warn!("Fetching {} failed, will retry: {}", location, e);
                Err(backoff::Error::Transient {
                    err: e,
                    retry_after: None,
                })
            }
            Err(e) => Err(backoff::Error::Permanent(e)),
        }
    })
    .await
    .map_err(|e| {
        if e.is_transient() {
            DataError::RetriesExhausted {
                location: location.to_string(),
                last_error: e.to_string(),
            }
        } else {
            e
        }
    })?;

    load(&body, encoding)
}

/// Owns the currently trusted tree. Readers take an `Arc` snapshot; a reload
/// swaps the whole tree at once.
#[derive(Debug, Clone)]
pub struct TreeHandle {
    current: Arc<VerifiedTree>,
}

impl TreeHandle {
    pub fn new(tree: VerifiedTree) -> Self {
        Self {
            current: Arc::new(tree),
        }
    }

    pub fn current(&self) -> Arc<VerifiedTree> {
        Arc::clone(&self.current)
    }

    pub fn root(&self) -> Hash32 {
        self.current.root()
    }

    /// Make sure the held tree matches the root published on-chain.
    ///
    /// Returns `Ok(true)` when a reload happened. A reloaded tree whose root
    /// still differs is rejected and the previous tree is kept.
    pub fn ensure_root<F>(&mut self, expected: &Hash32, loader: F) -> DataResult<bool>
    where
        F: FnOnce() -> DataResult<VerifiedTree>,
    {
        if self.root() == *expected {
            return Ok(false);
        }

        let reloaded = loader()?;
        self.replace(expected, reloaded)?;
        Ok(true)
    }

    /// Async form of [`TreeHandle::ensure_root`] that reloads from a store.
    pub async fn ensure_root_from_store<S>(
        &mut self,
        expected: &Hash32,
        store: &S,
        location: &str,
        policy: &RetryPolicy,
    ) -> DataResult<bool>
    where
        S: TreeStore + Sync,
    {
        if self.root() == *expected {
            return Ok(false);
        }

        let reloaded = fetch_verified_tree(store, location, self.current.encoding(), policy).await?;
        self.replace(expected, reloaded)?;
        Ok(true)
    }

    fn replace(&mut self, expected: &Hash32, reloaded: VerifiedTree) -> DataResult<()> {
        if reloaded.root() != *expected {
            warn!(
                "Reloaded tree has root {}, expected {}",
                hash_to_hex(&reloaded.root()),
                hash_to_hex(expected)
            );
            return Err(DataError::RootMismatch {
                expected: hash_to_hex(expected),
                computed: hash_to_hex(&reloaded.root()),
            });
        }

        info!(
            "Replacing tree {} with {}",
            hash_to_hex(&self.root()),
            hash_to_hex(expected)
        );
        self.current = Arc::new(reloaded);
        Ok(())
    }
}
