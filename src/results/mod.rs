//! Crawl results and the shared store workers append them to
//!
//! # Components
//!
//! - `PageResult`: every unique email found on one fetched page
//! - `ResultStore`: append-only, thread-safe list of `PageResult`s for one run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// All unique emails found on a single fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Unique, validated addresses in first-seen order
    pub emails: Vec<String>,

    /// The search/query URL that was crawled
    pub location: String,

    /// When the page was processed
    pub timestamp: DateTime<Utc>,

    /// The exact page URL the emails came from (after redirects)
    pub source: String,
}

impl PageResult {
    /// Creates a result stamped with the current time
    pub fn new(emails: Vec<String>, location: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            emails,
            location: location.into(),
            timestamp: Utc::now(),
            source: source.into(),
        }
    }
}

/// Append-only store shared by every crawl worker
///
/// Cloning the store clones the handle, not the data. Appends take the write
/// lock only for the push itself; snapshots take the read lock.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    results: Arc<RwLock<Vec<PageResult>>>,
}

impl ResultStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result
    pub fn append(&self, result: PageResult) {
        // A panic elsewhere can't leave a half-pushed Vec behind, so a
        // poisoned lock still guards consistent data.
        let mut results = self.results.write().unwrap_or_else(PoisonError::into_inner);
        results.push(result);
    }

    /// Returns a copy of the current contents in insertion order
    pub fn snapshot(&self) -> Vec<PageResult> {
        self.results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of results appended so far
    pub fn len(&self) -> usize {
        self.results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no result has been appended
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes this handle and returns the results
    ///
    /// Moves the list out without copying when no other handle is alive
    /// (every worker has finished); otherwise returns a snapshot.
    pub fn into_results(self) -> Vec<PageResult> {
        match Arc::try_unwrap(self.results) {
            Ok(lock) => lock.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    /// Total number of email addresses across all results
    pub fn email_count(&self) -> usize {
        self.results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|r| r.emails.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn result(n: usize) -> PageResult {
        PageResult::new(
            vec![format!("user{n}@example.com")],
            "https://search.example/?q=jobs",
            format!("https://site{n}.example/contact"),
        )
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = ResultStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let store = ResultStore::new();
        store.append(result(1));
        store.append(result(2));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].source, "https://site1.example/contact");
        assert_eq!(snapshot[1].source, "https://site2.example/contact");
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let store = ResultStore::new();
        store.append(result(1));
        let snapshot = store.snapshot();
        store.append(result(2));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clones_share_contents() {
        let store = ResultStore::new();
        let handle = store.clone();
        handle.append(result(7));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_into_results_last_handle() {
        let store = ResultStore::new();
        store.append(result(1));
        store.append(result(2));

        let results = store.into_results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].source, "https://site2.example/contact");
    }

    #[test]
    fn test_into_results_with_live_clone() {
        let store = ResultStore::new();
        let worker = store.clone();
        worker.append(result(1));

        let results = store.into_results();
        assert_eq!(results.len(), 1);

        // The surviving handle still works and still sees its own data
        worker.append(result(2));
        assert_eq!(worker.len(), 2);
    }

    #[test]
    fn test_email_count() {
        let store = ResultStore::new();
        store.append(PageResult::new(
            vec!["a@b.com".to_string(), "c@d.com".to_string()],
            "loc",
            "src",
        ));
        store.append(result(3));
        assert_eq!(store.email_count(), 3);
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let store = ResultStore::new();
        let writers = 64;
        let per_writer = 50;

        let handles: Vec<_> = (0..writers)
            .map(|w| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..per_writer {
                        store.append(result(w * per_writer + i));
                        if i % 10 == 0 {
                            let _ = store.snapshot();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), writers * per_writer);

        let mut sources: Vec<_> = snapshot.iter().map(|r| r.source.clone()).collect();
        sources.sort();
        sources.dedup();
        assert_eq!(sources.len(), writers * per_writer);
    }

    #[test]
    fn test_serializes_with_expected_fields() {
        let value = serde_json::to_value(result(1)).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("emails"));
        assert!(object.contains_key("location"));
        assert!(object.contains_key("timestamp"));
        assert!(object.contains_key("source"));
    }
}
