//! In-memory vector store: one per document category, brute-force cosine
//! search over a lazily materialized dense matrix, JSON snapshots on disk.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use finrag_core::error::{Error, Result as CoreResult};
use finrag_core::types::{DocId, DocType, Document, ScoredDocument, SearchSource};

/// Row-major copy of the stored vectors with cached L2 norms, rebuilt
/// whenever the store changed since the last search.
#[derive(Debug)]
struct DenseMatrix {
    values: Vec<f32>,
    norms: Vec<f32>,
    cols: usize,
}

impl DenseMatrix {
    fn build(vectors: &[Vec<f32>], cols: usize) -> Self {
        let mut values = Vec::with_capacity(vectors.len() * cols);
        let mut norms = Vec::with_capacity(vectors.len());
        for vector in vectors {
            values.extend_from_slice(vector);
            norms.push(vector.iter().map(|x| x * x).sum::<f32>().sqrt());
        }
        Self { values, norms, cols }
    }

    fn rows(&self) -> usize {
        self.norms.len()
    }

    fn row(&self, index: usize) -> &[f32] {
        &self.values[index * self.cols..(index + 1) * self.cols]
    }
}

/// Vectors and their documents for a single category, kept as parallel
/// arrays plus an id lookup. Mutation goes through `&mut self`; the only
/// interior state is the dense-matrix cache, which search rebuilds
/// lazily behind an `RwLock`.
pub struct DocumentStore {
    category: DocType,
    dimension: usize,
    vectors: Vec<Vec<f32>>,
    documents: Vec<Document>,
    id_to_index: HashMap<DocId, usize>,
    matrix: RwLock<Option<DenseMatrix>>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    dimension: usize,
    vectors: &'a [Vec<f32>],
    metadata: &'a [Document],
    id_to_index: &'a HashMap<DocId, usize>,
}

#[derive(Deserialize)]
struct Snapshot {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
    metadata: Vec<Document>,
    id_to_index: HashMap<DocId, usize>,
}

impl DocumentStore {
    pub fn new(category: DocType, dimension: usize) -> Self {
        Self {
            category,
            dimension,
            vectors: Vec::new(),
            documents: Vec::new(),
            id_to_index: HashMap::new(),
            matrix: RwLock::new(None),
        }
    }

    pub fn category(&self) -> DocType {
        self.category
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Whether a dense index currently backs this store. Adding or
    /// loading documents resets it until the next build.
    pub fn index_built(&self) -> bool {
        self.matrix.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    pub fn get(&self, doc_id: &str) -> Option<&Document> {
        self.id_to_index.get(doc_id).and_then(|idx| self.documents.get(*idx))
    }

    /// Append a vector and its document. When `doc_id` is `None` the
    /// store assigns `{category}_{n}` where `n` is the current length,
    /// so ids keep counting up across ingestion batches. The assigned id
    /// is written into the document and returned.
    pub fn add(
        &mut self,
        vector: Vec<f32>,
        mut document: Document,
        doc_id: Option<DocId>,
    ) -> CoreResult<DocId> {
        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                found: vector.len(),
            });
        }
        if document.doc_type() != self.category {
            return Err(Error::DocTypeMismatch {
                expected: self.category.to_string(),
                found: document.doc_type().to_string(),
            });
        }

        let id = doc_id.unwrap_or_else(|| format!("{}_{}", self.category, self.documents.len()));
        document.set_doc_id(id.clone());
        self.vectors.push(vector);
        self.documents.push(document);
        if self.id_to_index.insert(id.clone(), self.documents.len() - 1).is_some() {
            debug!("doc id {} reassigned, previous row is now unreachable by id", id);
        }
        self.invalidate();
        Ok(id)
    }

    /// Materialize the dense matrix. Idempotent; an empty store logs a
    /// warning and stays unbuilt.
    pub fn build_index(&self) {
        if self.vectors.is_empty() {
            warn!("no vectors to build {} index", self.category);
            return;
        }
        let mut guard = self.matrix.write().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            *guard = Some(DenseMatrix::build(&self.vectors, self.dimension));
            info!("built {} index with {} vectors", self.category, self.vectors.len());
        }
    }

    /// Cosine top-k. Returns an empty list for an empty store, a zero
    /// `top_k`, a wrong-dimension query or a zero-norm query; none of
    /// these touch the built state. Stored rows with zero norm cannot
    /// match anything and are skipped. Ties keep insertion order.
    pub fn search(&self, query: &[f32], top_k: usize, threshold: f32) -> Vec<ScoredDocument> {
        if self.vectors.is_empty() || top_k == 0 {
            return Vec::new();
        }
        if query.len() != self.dimension {
            warn!(
                "query dimension {} does not match {} store dimension {}",
                query.len(),
                self.category,
                self.dimension
            );
            return Vec::new();
        }
        let query_norm = query.iter().map(|x| x * x).sum::<f32>().sqrt();
        if query_norm == 0.0 {
            debug!("zero-norm query against {} store", self.category);
            return Vec::new();
        }

        self.build_index();
        let guard = self.matrix.read().unwrap_or_else(PoisonError::into_inner);
        let Some(matrix) = guard.as_ref() else {
            return Vec::new();
        };

        let mut scored: Vec<(usize, f32)> = Vec::new();
        for row in 0..matrix.rows() {
            let row_norm = matrix.norms[row];
            if row_norm == 0.0 {
                continue;
            }
            let dot: f32 = matrix.row(row).iter().zip(query).map(|(a, b)| a * b).sum();
            let score = dot / (row_norm * query_norm);
            if score >= threshold {
                scored.push((row, score));
            }
        }
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(row, score)| ScoredDocument {
                score,
                source: SearchSource::Vector,
                document: self.documents[row].clone(),
            })
            .collect()
    }

    /// Snapshot the store as JSON. Failures are logged and reported as
    /// `false`.
    pub fn save(&self, path: &Path) -> bool {
        match self.try_save(path) {
            Ok(()) => {
                info!("saved {} store ({} documents) to {}", self.category, self.len(), path.display());
                true
            }
            Err(e) => {
                error!("failed to save {} store to {}: {:#}", self.category, path.display(), e);
                false
            }
        }
    }

    /// Replace this store's contents with a snapshot. The snapshot's
    /// dimension is adopted. A failed or inconsistent load leaves the
    /// store exactly as it was and returns `false`; a successful load
    /// leaves the index unbuilt until the next search.
    pub fn load(&mut self, path: &Path) -> bool {
        match self.try_load(path) {
            Ok(snapshot) => {
                info!(
                    "loaded {} store ({} documents) from {}",
                    self.category,
                    snapshot.metadata.len(),
                    path.display()
                );
                self.dimension = snapshot.dimension;
                self.vectors = snapshot.vectors;
                self.documents = snapshot.metadata;
                self.id_to_index = snapshot.id_to_index;
                self.invalidate();
                true
            }
            Err(e) => {
                error!("failed to load {} store from {}: {:#}", self.category, path.display(), e);
                false
            }
        }
    }

    fn try_save(&self, path: &Path) -> Result<()> {
        let snapshot = SnapshotRef {
            dimension: self.dimension,
            vectors: &self.vectors,
            metadata: &self.documents,
            id_to_index: &self.id_to_index,
        };
        let json = serde_json::to_string(&snapshot).context("serializing store")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn try_load(&self, path: &Path) -> Result<Snapshot> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let snapshot: Snapshot =
            serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        if snapshot.vectors.len() != snapshot.metadata.len() {
            bail!(
                "corrupt snapshot: {} vectors vs {} documents",
                snapshot.vectors.len(),
                snapshot.metadata.len()
            );
        }
        if let Some(bad) = snapshot.vectors.iter().find(|v| v.len() != snapshot.dimension) {
            bail!("corrupt snapshot: vector of length {} in a dimension-{} store", bad.len(), snapshot.dimension);
        }
        if let Some(doc) = snapshot.metadata.iter().find(|d| d.doc_type() != self.category) {
            bail!("snapshot holds {} documents, this is the {} store", doc.doc_type(), self.category);
        }
        Ok(snapshot)
    }

    fn invalidate(&self) {
        *self.matrix.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("category", &self.category)
            .field("dimension", &self.dimension)
            .field("documents", &self.documents.len())
            .field("index_built", &self.index_built())
            .finish()
    }
}
