//! Embedding/vector-store collaborator boundary.
//!
//! The store owns embedding generation and persistence; the analyzer only
//! submits raw postings and reads back aligned embedding/document arrays.
//! `ChromaStore` talks to a Chroma-style collection API over HTTP; tests
//! substitute in-memory fakes through the `VectorStore` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

const EMBED_BATCH_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("store returned misaligned data: {0}")]
    Misaligned(String),
}

/// Embeddings and documents retrieved from the store, aligned 1:1 in the
/// order the documents were stored.
#[derive(Debug, Clone, Default)]
pub struct StoredCorpus {
    pub embeddings: Vec<Vec<f32>>,
    pub documents: Vec<String>,
}

/// The vector-store collaborator.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Number of stored documents.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Stores one batch of documents under the given ids. The store computes
    /// and owns the embeddings.
    async fn add_batch(&self, ids: &[String], documents: &[String]) -> Result<(), StoreError>;

    /// Retrieves embeddings and documents for the given ids, in id order.
    async fn get(&self, ids: &[String]) -> Result<StoredCorpus, StoreError>;
}

/// Positional document ids: `job_0`, `job_1`, ... Retrieval by these ids
/// reproduces storage order.
pub fn job_ids(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("job_{i}")).collect()
}

/// Stores the postings unless the collection is already populated.
///
/// Reprocessing an embedded corpus is a no-op: an existing count > 0 returns
/// the existing id list without re-embedding anything.
pub async fn embed_and_store(
    store: &dyn VectorStore,
    jobs: &[String],
) -> Result<Vec<String>, StoreError> {
    let existing = store.count().await?;
    if existing > 0 {
        info!("Found {existing} existing embeddings, skipping embedding step...");
        return Ok(job_ids(existing));
    }

    let ids = job_ids(jobs.len());
    for (batch_ids, batch_jobs) in ids.chunks(EMBED_BATCH_SIZE).zip(jobs.chunks(EMBED_BATCH_SIZE)) {
        store.add_batch(batch_ids, batch_jobs).await?;
        debug!("Stored batch of {} postings", batch_ids.len());
    }
    Ok(ids)
}

/// Retrieves the full stored corpus in storage order.
pub async fn fetch_corpus(store: &dyn VectorStore) -> Result<StoredCorpus, StoreError> {
    let ids = job_ids(store.count().await?);
    let corpus = store.get(&ids).await?;

    if corpus.embeddings.len() != corpus.documents.len() {
        return Err(StoreError::Misaligned(format!(
            "{} embeddings for {} documents",
            corpus.embeddings.len(),
            corpus.documents.len()
        )));
    }
    info!(
        "Retrieved {} embeddings and {} documents",
        corpus.embeddings.len(),
        corpus.documents.len()
    );
    Ok(corpus)
}

// ────────────────────────────────────────────────────────────────────────────
// Chroma HTTP client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    ids: Vec<String>,
    embeddings: Option<Vec<Vec<f32>>>,
    documents: Option<Vec<String>>,
}

/// HTTP client for one Chroma collection.
#[derive(Clone)]
pub struct ChromaStore {
    client: Client,
    base_url: String,
    collection_id: String,
}

impl ChromaStore {
    /// Connects to the store and resolves (or creates) the named collection.
    pub async fn connect(base_url: &str, collection_name: &str) -> Result<Self, StoreError> {
        let client = Client::new();
        let base_url = base_url.trim_end_matches('/').to_string();

        let response = client
            .post(format!("{base_url}/api/v1/collections"))
            .json(&serde_json::json!({
                "name": collection_name,
                "get_or_create": true,
            }))
            .send()
            .await?;
        let info: CollectionInfo = check(response).await?.json().await?;

        debug!("Resolved collection '{collection_name}' to id {}", info.id);
        Ok(Self {
            client,
            base_url,
            collection_id: info.id,
        })
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!(
            "{}/api/v1/collections/{}/{suffix}",
            self.base_url, self.collection_id
        )
    }
}

/// Converts non-success responses into `StoreError::Api`.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn count(&self) -> Result<usize, StoreError> {
        let response = self.client.get(self.collection_url("count")).send().await?;
        Ok(check(response).await?.json::<usize>().await?)
    }

    async fn add_batch(&self, ids: &[String], documents: &[String]) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.collection_url("add"))
            .json(&serde_json::json!({
                "ids": ids,
                "documents": documents,
            }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn get(&self, ids: &[String]) -> Result<StoredCorpus, StoreError> {
        let response = self
            .client
            .post(self.collection_url("get"))
            .json(&serde_json::json!({
                "ids": ids,
                "include": ["embeddings", "documents"],
            }))
            .send()
            .await?;
        let body: GetResponse = check(response).await?.json().await?;

        let embeddings = body
            .embeddings
            .ok_or_else(|| StoreError::Misaligned("no embeddings in response".to_string()))?;
        let documents = body
            .documents
            .ok_or_else(|| StoreError::Misaligned("no documents in response".to_string()))?;
        if body.ids.len() != embeddings.len() || body.ids.len() != documents.len() {
            return Err(StoreError::Misaligned(format!(
                "{} ids, {} embeddings, {} documents",
                body.ids.len(),
                embeddings.len(),
                documents.len()
            )));
        }

        // The store is not required to answer in request order; realign.
        let mut by_id: HashMap<String, (Vec<f32>, String)> = body
            .ids
            .into_iter()
            .zip(embeddings.into_iter().zip(documents))
            .collect();

        let mut corpus = StoredCorpus::default();
        for id in ids {
            let (embedding, document) = by_id
                .remove(id)
                .ok_or_else(|| StoreError::Misaligned(format!("id '{id}' missing from response")))?;
            corpus.embeddings.push(embedding);
            corpus.documents.push(document);
        }
        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory fake recording every call, substituted through the trait.
    #[derive(Default)]
    struct FakeStore {
        initial_count: usize,
        added: Mutex<Vec<(Vec<String>, Vec<String>)>>,
    }

    #[async_trait]
    impl VectorStore for FakeStore {
        async fn count(&self) -> Result<usize, StoreError> {
            let added: usize = self.added.lock().unwrap().iter().map(|(ids, _)| ids.len()).sum();
            Ok(self.initial_count + added)
        }

        async fn add_batch(&self, ids: &[String], documents: &[String]) -> Result<(), StoreError> {
            self.added
                .lock()
                .unwrap()
                .push((ids.to_vec(), documents.to_vec()));
            Ok(())
        }

        async fn get(&self, ids: &[String]) -> Result<StoredCorpus, StoreError> {
            Ok(StoredCorpus {
                embeddings: ids.iter().map(|_| vec![0.0, 1.0]).collect(),
                documents: ids.to_vec(),
            })
        }
    }

    #[test]
    fn test_job_ids_are_positional() {
        assert_eq!(job_ids(3), ["job_0", "job_1", "job_2"]);
        assert!(job_ids(0).is_empty());
    }

    #[tokio::test]
    async fn test_embed_and_store_batches_by_100() {
        let store = FakeStore::default();
        let jobs: Vec<String> = (0..250).map(|i| format!("posting {i}")).collect();

        let ids = embed_and_store(&store, &jobs).await.unwrap();
        assert_eq!(ids.len(), 250);

        let batches = store.added.lock().unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].0.len(), 100);
        assert_eq!(batches[2].0.len(), 50);
        assert_eq!(batches[0].0[0], "job_0");
        assert_eq!(batches[2].1[49], "posting 249");
    }

    #[tokio::test]
    async fn test_embed_and_store_is_idempotent() {
        let store = FakeStore {
            initial_count: 7,
            ..FakeStore::default()
        };
        let jobs = vec!["a".to_string(), "b".to_string()];

        let ids = embed_and_store(&store, &jobs).await.unwrap();

        // Existing embeddings short-circuit storage entirely.
        assert_eq!(ids.len(), 7);
        assert!(store.added.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_corpus_returns_aligned_arrays() {
        let store = FakeStore {
            initial_count: 4,
            ..FakeStore::default()
        };
        let corpus = fetch_corpus(&store).await.unwrap();
        assert_eq!(corpus.embeddings.len(), 4);
        assert_eq!(corpus.documents, job_ids(4));
    }

    struct MisalignedStore;

    #[async_trait]
    impl VectorStore for MisalignedStore {
        async fn count(&self) -> Result<usize, StoreError> {
            Ok(2)
        }
        async fn add_batch(&self, _: &[String], _: &[String]) -> Result<(), StoreError> {
            Ok(())
        }
        async fn get(&self, _: &[String]) -> Result<StoredCorpus, StoreError> {
            Ok(StoredCorpus {
                embeddings: vec![vec![0.0]],
                documents: vec!["a".to_string(), "b".to_string()],
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_corpus_rejects_misaligned_store() {
        let result = fetch_corpus(&MisalignedStore).await;
        assert!(matches!(result, Err(StoreError::Misaligned(_))));
    }
}
