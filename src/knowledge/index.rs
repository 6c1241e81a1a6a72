use super::cosine_similarity;
use crate::error::Error;
use std::cmp::Ordering;

/// How many chunks a question retrieves, matching the retriever default the
/// rest of the pipeline was tuned against.
pub const RETRIEVE_TOP_K: usize = 4;

/// In-memory nearest-neighbor index over chunk embeddings. Rebuilt from
/// scratch on every upload, never persisted.
pub struct SimilarityIndex {
    entries: Vec<IndexEntry>,
}

struct IndexEntry {
    embedding: Vec<f32>,
    content: String,
}

#[derive(Copy, Clone, Debug)]
struct Scored {
    entry: usize,
    similarity: f32,
}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.similarity.partial_cmp(&other.similarity)
    }
}

impl Ord for Scored {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

impl PartialEq for Scored {
    fn eq(&self, other: &Self) -> bool {
        self.similarity == other.similarity
    }
}

impl Eq for Scored {}

impl SimilarityIndex {
    pub fn from_chunks(chunks: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<Self, Error> {
        if chunks.len() != vectors.len() {
            return Err(Error::Generation(format!(
                "embedding count {} does not match chunk count {}",
                vectors.len(),
                chunks.len()
            )));
        }
        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(content, embedding)| IndexEntry { embedding, content })
            .collect();
        Ok(SimilarityIndex { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The `k` chunk texts most similar to the query vector, best first.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<&str> {
        let mut scored = Vec::new();
        for (entry, e) in self.entries.iter().enumerate() {
            let similarity = cosine_similarity(query, &e.embedding);
            debug!("entry: {}, similarity: {}", entry, similarity);
            scored.push(Scored { entry, similarity });
        }
        scored.sort_unstable_by(|a, b| b.cmp(a));
        scored
            .into_iter()
            .take(k)
            .map(|s| self.entries[s.entry].content.as_str())
            .collect()
    }
}
