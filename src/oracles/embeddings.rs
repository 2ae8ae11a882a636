// Word embedding similarity using all-MiniLM-L6-v2.
//
// The model is a sentence transformer, but single words embed well enough for
// synonym detection and, unlike a fixed vocabulary of word vectors, it has a
// representation for slang and misspellings via sub-word pieces. Words made
// only of the tokenizer's unknown piece are reported as unknown.
//
// The model runs locally via ONNX. Mean pooling is applied to token
// embeddings (matching the model's training). Each word is embedded once per
// oracle and cached.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, warn};

use super::traits::SimilarityOracle;
use super::vectors::cosine_similarity;
use crate::error::{Result, TopicanError};

/// Embedding dimension for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

const UNKNOWN_PIECE: &str = "[UNK]";

/// Similarity oracle backed by a local ONNX sentence-embedding model.
///
/// The session sits behind a Mutex because inference needs `&mut Session`;
/// the cache sits behind another so lookups stay `&self`.
pub struct OnnxWordEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    cache: Mutex<HashMap<String, Option<Vec<f32>>>>,
}

impl OnnxWordEmbedder {
    /// Load the embedding model and tokenizer from the given directory.
    ///
    /// Expects `model.onnx` and `tokenizer.json` in the directory.
    /// Run `topican download-model` first if they don't exist.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        for path in [&model_path, &tokenizer_path] {
            if !path.exists() {
                return Err(TopicanError::oracle(
                    "similarity",
                    format!(
                        "embedding model file not found: {}\nRun `topican download-model` to download it.",
                        path.display()
                    ),
                ));
            }
        }

        let session = load_session(&model_path)
            .map_err(|e| TopicanError::oracle("similarity", format!("{e:#}")))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            TopicanError::oracle("similarity", format!("failed to load tokenizer: {e}"))
        })?;

        debug!("Loaded word embedding model from {}", model_dir.display());

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn embedding(&self, word: &str) -> Option<Vec<f32>> {
        let word = word.to_lowercase();
        if let Some(hit) = self.cache.lock().ok()?.get(&word) {
            return hit.clone();
        }

        let vector = if self.is_known_word(&word) {
            match self.embed_batch(std::slice::from_ref(&word)) {
                Ok(mut batch) => batch.pop(),
                Err(e) => {
                    warn!(error = %e, word = %word, "Word embedding failed");
                    None
                }
            }
        } else {
            None
        };

        self.cache.lock().ok()?.insert(word, vector.clone());
        vector
    }

    /// A word is unknown when every piece it tokenizes to is `[UNK]`.
    fn is_known_word(&self, word: &str) -> bool {
        match self.tokenizer.encode(word, false) {
            Ok(encoding) => encoding.get_tokens().iter().any(|t| t != UNKNOWN_PIECE),
            Err(_) => false,
        }
    }

    /// Tokenize, run inference and mean-pool a batch of texts.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let encodings: Vec<_> = texts
            .iter()
            .map(|t| {
                self.tokenizer
                    .encode(t.as_str(), true)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let batch_size = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        if max_len == 0 {
            return Ok(vec![vec![0.0; EMBEDDING_DIM]; batch_size]);
        }

        // BERT inputs: token ids and attention mask padded with 0, token
        // type ids all zero for single-segment input.
        let mut input_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut attention_mask_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut token_type_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);

        for enc in &encodings {
            let ids = enc.get_ids();
            let pad_len = max_len - ids.len();

            input_ids_flat.extend(ids.iter().map(|&id| id as i64));
            attention_mask_flat.extend(enc.get_attention_mask().iter().map(|&m| m as i64));
            token_type_ids_flat.extend(std::iter::repeat_n(0i64, ids.len()));

            input_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
            attention_mask_flat.extend(std::iter::repeat_n(0i64, pad_len));
            token_type_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
        }

        let shape = [batch_size as i64, max_len as i64];

        let input_ids_tensor = Tensor::from_array((shape, input_ids_flat))
            .context("Failed to create input_ids tensor")?;
        let attention_mask_tensor = Tensor::from_array((shape, attention_mask_flat.clone()))
            .context("Failed to create attention_mask tensor")?;
        let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids_flat))
            .context("Failed to create token_type_ids tensor")?;

        // Output is last_hidden_state: [batch, seq_len, 384]
        let hidden_states = {
            let mut session = self
                .session
                .lock()
                .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

            let outputs = session
                .run(ort::inputs! {
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor
                })
                .context("Embedding ONNX inference failed")?;

            let (_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .context("Failed to extract embedding output tensor")?;

            data.to_vec()
        };

        Ok(mean_pool(&hidden_states, &attention_mask_flat, batch_size, max_len))
    }
}

impl SimilarityOracle for OnnxWordEmbedder {
    fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        let va = self.embedding(a)?;
        let vb = self.embedding(b)?;
        cosine_similarity(&va, &vb)
    }

    fn knows(&self, lemma: &str) -> bool {
        self.embedding(lemma).is_some()
    }
}

fn load_session(model_path: &Path) -> anyhow::Result<Session> {
    Session::builder()
        .context("Failed to create ONNX session builder")?
        .commit_from_file(model_path)
        .with_context(|| format!("Failed to load embedding model from {}", model_path.display()))
}

/// Average token embeddings per text, weighted by the attention mask.
fn mean_pool(hidden: &[f32], mask: &[i64], batch_size: usize, max_len: usize) -> Vec<Vec<f32>> {
    let mut embeddings = Vec::with_capacity(batch_size);

    for i in 0..batch_size {
        let mut sum = vec![0.0_f32; EMBEDDING_DIM];
        let mut mask_sum = 0.0_f32;

        for j in 0..max_len {
            let mask_val = mask[i * max_len + j] as f32;
            if mask_val > 0.0 {
                mask_sum += mask_val;
                let offset = (i * max_len + j) * EMBEDDING_DIM;
                for (k, slot) in sum.iter_mut().enumerate() {
                    *slot += hidden[offset + k] * mask_val;
                }
            }
        }

        if mask_sum > 0.0 {
            for val in &mut sum {
                *val /= mask_sum;
            }
        }

        embeddings.push(sum);
    }

    embeddings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_model_is_unavailable() {
        let dir = std::env::temp_dir().join("topican-test-no-model");
        let result = OnnxWordEmbedder::load(&dir);
        assert!(matches!(
            result,
            Err(TopicanError::OracleUnavailable { .. })
        ));
    }

    #[test]
    fn test_mean_pool_ignores_padding() {
        // One text, two positions; only the first is a real token.
        let mut hidden = vec![0.0_f32; 2 * EMBEDDING_DIM];
        hidden[0] = 2.0;
        hidden[EMBEDDING_DIM] = 100.0;
        let pooled = mean_pool(&hidden, &[1, 0], 1, 2);
        assert_eq!(pooled.len(), 1);
        assert!((pooled[0][0] - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_mean_pool_averages_real_tokens() {
        let mut hidden = vec![0.0_f32; 2 * EMBEDDING_DIM];
        hidden[0] = 1.0;
        hidden[EMBEDDING_DIM] = 3.0;
        let pooled = mean_pool(&hidden, &[1, 1], 1, 2);
        assert!((pooled[0][0] - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_mean_pool_all_masked_is_zero() {
        let hidden = vec![5.0_f32; EMBEDDING_DIM];
        let pooled = mean_pool(&hidden, &[0], 1, 1);
        assert!(pooled[0].iter().all(|&v| v == 0.0));
    }
}
