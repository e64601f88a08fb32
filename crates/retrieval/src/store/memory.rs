//! In-memory vector store with exhaustive cosine ranking.

use crate::document::Document;
use crate::embeddings::EmbeddingProvider;
use crate::retriever::{Retriever, RetrieverConfig};
use crate::similarity::cosine_similarity;
use crate::store::{SearchFilters, VectorStore};
use recall_core::{AppError, AppResult};
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A document paired with its embedding and insertion position.
#[derive(Debug, Clone)]
struct StoredEntry {
    document: Document,
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Default)]
struct Entries {
    /// Established by the first insertion
    dimensions: Option<usize>,
    items: Vec<StoredEntry>,
}

/// Process-lifetime vector store.
///
/// Readers share the entry list; an insertion takes it exclusively. Embedding
/// happens before the write lock is taken, and a batch is validated in full
/// before anything is appended, so a failed insertion leaves the store as it
/// was.
#[derive(Debug)]
pub struct MemoryVectorStore {
    embeddings: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Entries>,
}

impl MemoryVectorStore {
    /// Create an empty store using `embeddings` for document and query text.
    pub fn new(embeddings: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embeddings,
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Create a store and insert `documents`.
    pub async fn from_documents(
        documents: Vec<Document>,
        embeddings: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        let store = Self::new(embeddings);
        store.add_documents(documents).await?;
        Ok(store)
    }

    /// Create a store from raw texts.
    ///
    /// `metadatas` is either empty or has one entry per text.
    pub async fn from_texts(
        texts: Vec<String>,
        metadatas: Vec<Map<String, Value>>,
        embeddings: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        if !metadatas.is_empty() && metadatas.len() != texts.len() {
            return Err(AppError::InvalidArgument(format!(
                "Got {} metadata entries for {} texts",
                metadatas.len(),
                texts.len()
            )));
        }

        let mut metadatas = metadatas.into_iter();
        let documents = texts
            .into_iter()
            .map(|page_content| Document {
                page_content,
                metadata: metadatas.next().unwrap_or_default(),
            })
            .collect();

        Self::from_documents(documents, embeddings).await
    }

    /// The provider used to embed documents.
    pub fn embeddings(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embeddings
    }

    /// Embed and append documents, in input order.
    ///
    /// All texts are embedded with a single batch call.
    pub async fn add_documents(&self, documents: Vec<Document>) -> AppResult<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
        let vectors = self.embeddings.embed_batch(&texts).await?;

        if vectors.len() != documents.len() {
            return Err(AppError::Embedding(format!(
                "Provider '{}' returned {} embeddings for {} texts",
                self.embeddings.provider_name(),
                vectors.len(),
                documents.len()
            )));
        }

        self.append(vectors, documents)
    }

    /// Append documents with precomputed embeddings.
    pub fn add_vectors(&self, vectors: Vec<Vec<f32>>, documents: Vec<Document>) -> AppResult<()> {
        if vectors.len() != documents.len() {
            return Err(AppError::InvalidArgument(format!(
                "Got {} vectors for {} documents",
                vectors.len(),
                documents.len()
            )));
        }

        if documents.is_empty() {
            return Ok(());
        }

        self.append(vectors, documents)
    }

    /// Dimensionality established by the first insertion, if any.
    pub fn dimensions(&self) -> AppResult<Option<usize>> {
        Ok(self.read()?.dimensions)
    }

    /// Build a retriever over this store sharing its embedding provider.
    pub fn as_retriever(self: &Arc<Self>, config: RetrieverConfig) -> Retriever {
        let store: Arc<dyn VectorStore> = Arc::clone(self) as Arc<dyn VectorStore>;
        Retriever::new(Arc::clone(&self.embeddings), store, config)
    }

    fn append(&self, vectors: Vec<Vec<f32>>, documents: Vec<Document>) -> AppResult<()> {
        let mut entries = self.write()?;

        let expected = match entries.dimensions {
            Some(dimensions) => dimensions,
            None => vectors[0].len(),
        };

        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(AppError::DimensionMismatch {
                expected,
                actual: bad.len(),
            });
        }

        let start = entries.items.len();
        entries.dimensions = Some(expected);
        entries.items.extend(
            documents
                .into_iter()
                .zip(vectors)
                .enumerate()
                .map(|(offset, (document, embedding))| StoredEntry {
                    document,
                    embedding,
                    index: start + offset,
                }),
        );

        tracing::info!(
            "Added {} documents to memory store ({} total, {} dimensions)",
            entries.items.len() - start,
            entries.items.len(),
            expected
        );

        Ok(())
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Entries>> {
        self.entries
            .read()
            .map_err(|e| AppError::Store(format!("Memory store lock poisoned: {}", e)))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Entries>> {
        self.entries
            .write()
            .map_err(|e| AppError::Store(format!("Memory store lock poisoned: {}", e)))
    }
}

impl VectorStore for MemoryVectorStore {
    fn similarity_search_filtered(
        &self,
        query_embedding: &[f32],
        k: usize,
        filters: &SearchFilters,
    ) -> AppResult<Vec<(Document, f32)>> {
        let entries = self.read()?;

        if k == 0 || entries.items.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(expected) = entries.dimensions {
            if query_embedding.len() != expected {
                return Err(AppError::DimensionMismatch {
                    expected,
                    actual: query_embedding.len(),
                });
            }
        }

        let mut scored: Vec<(f32, &StoredEntry)> = entries
            .items
            .iter()
            .filter(|entry| filters.matches_document(&entry.document))
            .map(|entry| (cosine_similarity(query_embedding, &entry.embedding), entry))
            .filter(|(score, _)| filters.accepts_score(*score))
            .collect();

        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b.total_cmp(score_a).then(a.index.cmp(&b.index))
        });
        scored.truncate(k);

        tracing::debug!(
            "Ranked {} of {} entries (k={}, filtered={})",
            scored.len(),
            entries.items.len(),
            k,
            filters.has_filters()
        );

        Ok(scored
            .into_iter()
            .map(|(score, entry)| (entry.document.clone(), score))
            .collect())
    }

    fn len(&self) -> AppResult<usize> {
        Ok(self.read()?.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{FakeProvider, TrigramProvider};

    fn fake_store() -> MemoryVectorStore {
        MemoryVectorStore::new(Arc::new(FakeProvider::new()))
    }

    fn doc(text: &str) -> Document {
        Document::new(text)
    }

    #[test]
    fn test_empty_store_returns_no_results() {
        let store = fake_store();
        let results = store.similarity_search(&[1.0, 0.0, 0.0, 0.0], 5).unwrap();

        assert!(results.is_empty());
        assert!(store.is_empty().unwrap());
        assert_eq!(store.dimensions().unwrap(), None);
    }

    #[test]
    fn test_scores_are_ordered_descending() {
        let store = fake_store();
        store
            .add_vectors(
                vec![
                    vec![0.0, 1.0, 0.0],
                    vec![0.7, 0.7, 0.0],
                    vec![1.0, 0.0, 0.0],
                    vec![-1.0, 0.0, 0.0],
                ],
                vec![doc("C"), doc("B"), doc("A"), doc("D")],
            )
            .unwrap();

        let results = store.similarity_search(&[1.0, 0.0, 0.0], 10).unwrap();
        let order: Vec<&str> = results.iter().map(|(d, _)| d.page_content.as_str()).collect();

        assert_eq!(order, vec!["A", "B", "C", "D"]);
        assert!(results[0].1 > 0.99);
        assert!(results[3].1 < -0.99);
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let store = fake_store();
        store
            .add_vectors(
                vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![2.0, 0.0], vec![3.0, 0.0]],
                vec![doc("first"), doc("other"), doc("second"), doc("third")],
            )
            .unwrap();

        let results = store.similarity_search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(results[0].0.page_content, "first");
        assert_eq!(results[1].0.page_content, "second");
    }

    #[test]
    fn test_result_size() {
        let store = fake_store();
        let vectors: Vec<Vec<f32>> = (0..10).map(|i| vec![i as f32, 1.0]).collect();
        let docs: Vec<Document> = (0..10).map(|i| doc(&format!("Text {}", i))).collect();
        store.add_vectors(vectors, docs).unwrap();

        assert_eq!(store.similarity_search(&[1.0, 0.0], 3).unwrap().len(), 3);
        assert_eq!(store.similarity_search(&[1.0, 0.0], 10).unwrap().len(), 10);
        assert_eq!(store.similarity_search(&[1.0, 0.0], 25).unwrap().len(), 10);
        assert!(store.similarity_search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_zero_query_scores_zero() {
        let store = fake_store();
        store
            .add_vectors(vec![vec![1.0, 2.0]], vec![doc("only")])
            .unwrap();

        let results = store.similarity_search(&[0.0, 0.0], 1).unwrap();
        assert_eq!(results[0].1, 0.0);
    }

    #[test]
    fn test_large_magnitude_query_ranks_finitely() {
        let store = fake_store();
        store
            .add_vectors(
                vec![vec![1e20, -1e20], vec![1.0, 0.0]],
                vec![doc("orthogonal"), doc("aligned")],
            )
            .unwrap();

        let results = store.similarity_search(&[1e20, 1e20], 2).unwrap();
        assert_eq!(results[0].0.page_content, "aligned");
        assert_eq!(results[1].0.page_content, "orthogonal");
        assert!(results.iter().all(|(_, score)| score.is_finite()));
        assert!(results[0].1 > 0.7);
    }

    #[test]
    fn test_dimension_mismatch_leaves_store_unchanged() {
        let store = fake_store();
        store
            .add_vectors(vec![vec![1.0, 0.0, 0.0]], vec![doc("kept")])
            .unwrap();

        let result = store.add_vectors(
            vec![vec![1.0, 0.0, 0.0], vec![1.0, 0.0]],
            vec![doc("ok"), doc("short")],
        );

        assert!(matches!(
            result,
            Err(AppError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.dimensions().unwrap(), Some(3));
    }

    #[test]
    fn test_first_batch_must_be_consistent() {
        let store = fake_store();
        let result = store.add_vectors(vec![vec![1.0], vec![1.0, 2.0]], vec![doc("a"), doc("b")]);

        assert!(matches!(result, Err(AppError::DimensionMismatch { .. })));
        assert!(store.is_empty().unwrap());
        assert_eq!(store.dimensions().unwrap(), None);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let store = fake_store();
        store
            .add_vectors(vec![vec![1.0, 0.0, 0.0]], vec![doc("a")])
            .unwrap();

        assert!(matches!(
            store.similarity_search(&[1.0, 0.0], 1),
            Err(AppError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_add_vectors_length_mismatch() {
        let store = fake_store();
        let result = store.add_vectors(vec![vec![1.0]], vec![doc("a"), doc("b")]);
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_filters_apply_before_top_k() {
        let store = fake_store();
        store
            .add_vectors(
                vec![vec![1.0, 0.0], vec![0.9, 0.1], vec![0.5, 0.5]],
                vec![
                    doc("best").with_metadata("lang", "en"),
                    doc("runner-up").with_metadata("lang", "en"),
                    doc("german").with_metadata("lang", "de"),
                ],
            )
            .unwrap();

        let filters = SearchFilters::new().with_metadata("lang", "de");
        let results = store
            .similarity_search_filtered(&[1.0, 0.0], 1, &filters)
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.page_content, "german");

        let filters = SearchFilters::new().with_min_score(0.95);
        let results = store
            .similarity_search_filtered(&[1.0, 0.0], 3, &filters)
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_add_documents_embeds_in_order() {
        let store = MemoryVectorStore::new(Arc::new(TrigramProvider::new(256)));
        store
            .add_documents(vec![
                doc("Rust is a systems programming language"),
                doc("Cooking recipes for pasta"),
            ])
            .await
            .unwrap();

        let query = store.embeddings().embed("rust programming").await.unwrap();
        let results = store.similarity_search(&query, 2).unwrap();

        assert_eq!(store.dimensions().unwrap(), Some(256));
        assert_eq!(
            results[0].0.page_content,
            "Rust is a systems programming language"
        );
        assert!(results[0].1 > results[1].1);
    }

    #[tokio::test]
    async fn test_from_texts() {
        let mut meta = Map::new();
        meta.insert("id".to_string(), Value::from(1));

        let store = MemoryVectorStore::from_texts(
            vec!["one".to_string(), "two".to_string()],
            vec![meta.clone(), Map::new()],
            Arc::new(FakeProvider::new()),
        )
        .await
        .unwrap();

        let results = store.similarity_search(&[0.1, 0.2, 0.3, 0.4], 2).unwrap();
        assert_eq!(results[0].0.metadata, meta);
        assert!(results[1].0.metadata.is_empty());

        let result = MemoryVectorStore::from_texts(
            vec!["one".to_string()],
            vec![Map::new(), Map::new()],
            Arc::new(FakeProvider::new()),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_add_empty_batch_is_noop() {
        let store = fake_store();
        store.add_documents(Vec::new()).await.unwrap();
        assert!(store.is_empty().unwrap());
    }
}
