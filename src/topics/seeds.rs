// User-defined seed groups.
//
// File format is a JSON object mapping each root to its synonyms, in the
// order the groups should be created:
//
//   { "work": ["job", "career"], "_pay": ["salary", "wage"] }

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{Result, TopicanError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedGroup {
    pub root: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl SeedGroup {
    pub fn new(root: &str, synonyms: &[&str]) -> Self {
        Self {
            root: root.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Root and synonyms lower-cased, with a leading `_` on the root dropped.
    pub fn normalized(&self) -> Result<SeedGroup> {
        let root = normalize(&self.root);
        if root.is_empty() {
            return Err(TopicanError::Configuration(
                "seed group with an empty root".into(),
            ));
        }
        let synonyms = self
            .synonyms
            .iter()
            .map(|s| normalize(s))
            .filter(|s| !s.is_empty())
            .collect();
        Ok(SeedGroup { root, synonyms })
    }
}

fn normalize(word: &str) -> String {
    word.trim().trim_start_matches('_').trim().to_lowercase()
}

/// Load seed groups from a JSON file.
pub fn load_seed_groups(path: &Path) -> Result<Vec<SeedGroup>> {
    let content = std::fs::read_to_string(path).map_err(|e| TopicanError::resource(path, e))?;
    let groups = parse_seed_groups(&content).map_err(|e| TopicanError::invalid_data(path, e))?;
    info!(groups = groups.len(), path = %path.display(), "Loaded seed groups");
    Ok(groups)
}

fn parse_seed_groups(content: &str) -> std::result::Result<Vec<SeedGroup>, String> {
    let map: Map<String, Value> = serde_json::from_str(content).map_err(|e| e.to_string())?;
    map.into_iter()
        .map(|(root, synonyms)| {
            let synonyms: Vec<String> = serde_json::from_value(synonyms)
                .map_err(|e| format!("synonyms of '{root}': {e}"))?;
            Ok(SeedGroup { root, synonyms })
        })
        .collect()
}
