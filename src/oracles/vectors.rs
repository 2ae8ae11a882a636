// Word vectors: a similarity oracle over GloVe-format text files.
//
// Each line holds a word followed by its vector components, separated by
// spaces. All vectors in a file must share one dimension; lines that do not
// are skipped with a warning rather than failing the whole load.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};

use super::traits::SimilarityOracle;
use crate::error::{Result, TopicanError};

/// Dense word vectors keyed by lower-cased word.
#[derive(Debug, Clone, Default)]
pub struct WordVectors {
    vectors: HashMap<String, Vec<f32>>,
    dim: usize,
}

impl WordVectors {
    /// Build from in-memory vectors. Vectors whose length differs from the
    /// first one seen are dropped.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut out = Self::default();
        for (word, vector) in pairs {
            out.insert(word, vector);
        }
        out
    }

    /// Load GloVe-format vectors from a text file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| TopicanError::resource(path, e))?;
        let reader = BufReader::new(file);

        let mut out = Self::default();
        let mut skipped = 0usize;

        for line in reader.lines() {
            let line = line.map_err(|e| TopicanError::resource(path, e))?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let parsed: std::result::Result<Vec<f32>, _> = parts.map(str::parse::<f32>).collect();
            match parsed {
                Ok(vector) if !vector.is_empty() => {
                    if !out.insert(word.to_string(), vector) {
                        skipped += 1;
                    }
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(skipped, path = %path.display(), "Skipped malformed vector lines");
        }
        info!(
            words = out.vectors.len(),
            dim = out.dim,
            path = %path.display(),
            "Loaded word vectors"
        );

        Ok(out)
    }

    /// Insert one vector; returns false if its dimension does not match.
    fn insert(&mut self, word: String, vector: Vec<f32>) -> bool {
        if self.dim == 0 {
            self.dim = vector.len();
        } else if vector.len() != self.dim {
            return false;
        }
        self.vectors.insert(word.to_lowercase(), vector);
        true
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn get(&self, word: &str) -> Option<&Vec<f32>> {
        self.vectors.get(&word.to_lowercase())
    }
}

impl SimilarityOracle for WordVectors {
    fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        let va = self.get(a)?;
        let vb = self.get(b)?;
        cosine_similarity(va, vb)
    }

    fn knows(&self, lemma: &str) -> bool {
        self.get(lemma).is_some()
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_empty() {
            return Err(TopicanError::oracle("similarity", "no word vectors loaded"));
        }
        Ok(())
    }
}

/// Cosine similarity in [-1, 1], or None for empty, mismatched or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    let denom = mag_a * mag_b;
    if denom < f64::EPSILON {
        None
    } else {
        Some((dot / denom).clamp(-1.0, 1.0))
    }
}
