// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types for the long-term memory system.

/// One long-term entry with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEntry {
    /// The canonical line as it was inserted.
    pub text: String,
    /// Embedding vector for similarity search.
    pub embedding: Vec<f32>,
}

/// An entry with its similarity to a probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    /// Position of the entry in insertion order.
    pub position: usize,
    /// The entry text.
    pub text: String,
    /// Cosine similarity to the probe.
    pub score: f32,
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 when the lengths differ or either vector has zero norm,
/// so a malformed embedding ranks last instead of aborting the query.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// L2-normalize a vector.
pub fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vec.iter().map(|v| v / norm).collect()
    } else {
        vec.to_vec()
    }
}
