//! Mock store for testing.
//!
//! This store keeps secrets in memory, in insertion order, with fault
//! injection for listing and per-name fetches and counters for every call.

use crate::{ExportError, Result, SecretRecord, SecretStore};
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Default number of names returned per listing page.
const DEFAULT_PAGE_SIZE: usize = 25;

/// Mock secret store for testing.
///
/// # Example
///
/// ```
/// use keyvault_export::backends::mock::MockStore;
/// use keyvault_export::{ErrorKind, SecretStore};
///
/// #[tokio::main]
/// async fn main() {
///     let store = MockStore::new()
///         .with_secret("db-host", "10.0.0.5")
///         .with_fetch_error("db-password", "Forbidden");
///
///     assert_eq!(store.get_secret("db-host").await.unwrap().value, "10.0.0.5");
///
///     let err = store.get_secret("db-password").await.unwrap_err();
///     assert_eq!(err.kind(), ErrorKind::Fetch);
///     assert_eq!(store.fetch_calls(), 2);
/// }
/// ```
pub struct MockStore {
    secrets: RwLock<Vec<(String, String)>>,
    fetched: RwLock<Vec<String>>,
    page_size: usize,
    list_calls: AtomicUsize,
    fetch_calls: AtomicUsize,

    /// Error message returned by the first listing page
    pub list_error: Option<String>,
    /// Error messages returned by `get_secret()`, keyed by name
    pub fetch_errors: HashMap<String, String>,
}

impl MockStore {
    /// Creates an empty mock store.
    pub fn new() -> Self {
        Self {
            secrets: RwLock::new(Vec::new()),
            fetched: RwLock::new(Vec::new()),
            page_size: DEFAULT_PAGE_SIZE,
            list_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            list_error: None,
            fetch_errors: HashMap::new(),
        }
    }

    /// Adds a secret, replacing the value if the name already exists.
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        upsert(self.secrets.get_mut(), name.into(), value.into());
        self
    }

    /// Makes fetching `name` fail with `message`.
    pub fn with_fetch_error(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.fetch_errors.insert(name.into(), message.into());
        self
    }

    /// Makes listing fail with `message`.
    pub fn with_list_error(mut self, message: impl Into<String>) -> Self {
        self.list_error = Some(message.into());
        self
    }

    /// Sets how many names each listing page holds.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Adds or replaces a secret on a shared store.
    pub async fn set_secret(&self, name: impl Into<String>, value: impl Into<String>) {
        let mut secrets = self.secrets.write().await;
        upsert(&mut secrets, name.into(), value.into());
    }

    /// Number of times listing was started.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_secret()` calls, failed ones included.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Names passed to `get_secret()`, in call order.
    pub async fn fetched(&self) -> Vec<String> {
        self.fetched.read().await.clone()
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

fn upsert(secrets: &mut Vec<(String, String)>, name: String, value: String) {
    match secrets.iter_mut().find(|(existing, _)| *existing == name) {
        Some(entry) => entry.1 = value,
        None => secrets.push((name, value)),
    }
}

#[async_trait]
impl SecretStore for MockStore {
    fn name(&self) -> &str {
        "mock"
    }

    fn list_secret_names(&self) -> BoxStream<'_, Result<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let page_size = self.page_size;

        stream::try_unfold(0usize, move |offset| async move {
            if let Some(ref message) = self.list_error {
                return Err(ExportError::Enumerate(message.clone()));
            }

            let secrets = self.secrets.read().await;
            if offset >= secrets.len() {
                return Ok(None);
            }

            let page: Vec<String> = secrets
                .iter()
                .skip(offset)
                .take(page_size)
                .map(|(name, _)| name.clone())
                .collect();
            let next = offset + page.len();
            Ok(Some((page, next)))
        })
        .map_ok(|page| stream::iter(page.into_iter().map(Ok::<_, ExportError>)))
        .try_flatten()
        .boxed()
    }

    async fn get_secret(&self, name: &str) -> Result<SecretRecord> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetched.write().await.push(name.to_string());

        if let Some(message) = self.fetch_errors.get(name) {
            return Err(ExportError::fetch(name, message));
        }

        let secrets = self.secrets.read().await;
        secrets
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(name, value)| SecretRecord::new(name.clone(), value.clone()))
            .ok_or_else(|| {
                ExportError::fetch(
                    name,
                    format!("A secret with (name/id) {name} was not found in this key vault."),
                )
            })
    }
}
