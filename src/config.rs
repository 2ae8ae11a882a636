use std::env;
use std::path::PathBuf;

use anyhow::Result;

/// Which similarity backend to use.
#[derive(Debug, Clone, PartialEq)]
pub enum SimilarityBackend {
    /// GloVe-format word vectors from TOPICAN_VECTORS (default)
    Vectors,
    /// Local ONNX sentence-embedding model, applied to single words
    Onnx,
}

/// Central configuration loaded from environment variables.
///
/// Resource paths come from env vars; the .env file is loaded automatically
/// at startup via dotenvy. Per-run analysis parameters are CLI flags.
pub struct Config {
    /// Hyponym table JSON ({"hypernym": ["hyponym", ...]})
    pub taxonomy_path: Option<PathBuf>,
    /// Which similarity oracle to use (default: Vectors)
    pub similarity_backend: SimilarityBackend,
    /// GloVe-format vectors file
    pub vectors_path: Option<PathBuf>,
    /// Directory containing the ONNX model files
    pub model_dir: PathBuf,
    /// Optional tagger lexicon overriding the built-in heuristics
    pub lexicon_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nothing is required at load time; each command checks what it needs
    /// with the `require_*` methods.
    pub fn load() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = |key: &str| var(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        let similarity_backend = match var("TOPICAN_SIMILARITY").as_deref() {
            None | Some("vectors") => SimilarityBackend::Vectors,
            Some("onnx") => SimilarityBackend::Onnx,
            Some(other) => anyhow::bail!(
                "TOPICAN_SIMILARITY must be 'vectors' or 'onnx', got '{other}'"
            ),
        };

        Ok(Self {
            taxonomy_path: path("TOPICAN_TAXONOMY"),
            similarity_backend,
            vectors_path: path("TOPICAN_VECTORS"),
            model_dir: path("TOPICAN_MODEL_DIR")
                .unwrap_or_else(crate::oracles::download::default_model_dir),
            lexicon_path: path("TOPICAN_LEXICON"),
        })
    }

    /// Check that the hyponym table is configured.
    /// Call this before any operation that needs taxonomic grouping.
    pub fn require_taxonomy(&self) -> Result<&PathBuf> {
        match &self.taxonomy_path {
            Some(path) => Ok(path),
            None => anyhow::bail!(
                "TOPICAN_TAXONOMY not set. Add the path of a hyponym table to your .env file,\n\
                 or pass --similarity-only to group by similarity alone."
            ),
        }
    }

    /// Validate that the chosen similarity backend has what it needs.
    /// For vectors: TOPICAN_VECTORS must be set.
    /// For ONNX: model files must exist (or user should run download-model).
    pub fn require_similarity(&self) -> Result<()> {
        match self.similarity_backend {
            SimilarityBackend::Vectors => {
                if self.vectors_path.is_none() {
                    anyhow::bail!(
                        "TOPICAN_VECTORS not set. Add the path of a GloVe-format vectors file \
                         to your .env file.\n\
                         Or set TOPICAN_SIMILARITY=onnx to use the local embedding model."
                    );
                }
                Ok(())
            }
            SimilarityBackend::Onnx => {
                if !crate::oracles::download::embedding_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "ONNX model files not found in {}\n\
                         Run `topican download-model` to download them.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
        }
    }
}
