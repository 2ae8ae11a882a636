// Model download helper for the ONNX word-embedding oracle.
//
// Downloads all-MiniLM-L6-v2 from HuggingFace into a platform-appropriate
// directory (~/.local/share/topican/models/ on Linux) so it persists across
// runs.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// HuggingFace repo for the sentence embedding model.
const EMBEDDING_HF_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

/// Model files: (path in the HuggingFace repo, local file name).
const MODEL_FILES: [(&str, &str); 2] = [
    ("tokenizer.json", "tokenizer.json"),
    ("onnx/model.onnx", "model.onnx"),
];

/// Returns the default directory for storing model files.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("topican")
        .join("models")
}

/// Subdirectory within model_dir for the embedding model.
pub fn embedding_model_dir(base: &Path) -> PathBuf {
    base.join("all-MiniLM-L6-v2")
}

/// Check whether every embedding model file exists.
pub fn embedding_files_present(base: &Path) -> bool {
    let embed_dir = embedding_model_dir(base);
    MODEL_FILES
        .iter()
        .all(|(_, local)| embed_dir.join(local).exists())
}

/// Download the embedding model, skipping files that already exist.
pub async fn download_model(base: &Path) -> Result<()> {
    let embed_dir = embedding_model_dir(base);
    std::fs::create_dir_all(&embed_dir)
        .with_context(|| format!("Failed to create {}", embed_dir.display()))?;

    println!("\nWord embedding model (all-MiniLM-L6-v2):");

    let client = reqwest::Client::new();
    for (remote, local) in MODEL_FILES {
        let dest = embed_dir.join(local);
        if dest.exists() {
            info!(file = local, "Model file already present, skipping");
            println!("  {local} (already present)");
            continue;
        }
        let bytes = fetch(&client, &format!("{EMBEDDING_HF_URL}/{remote}"), &dest).await?;
        println!("  {local} {} ({} KiB)", "done".green(), bytes / 1024);
    }

    Ok(())
}

/// Stream `url` into `dest`, returning the byte count. The body lands in a
/// `.part` sibling first and is renamed only once complete.
async fn fetch(client: &reqwest::Client, url: &str, dest: &Path) -> Result<u64> {
    let mut response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .with_context(|| format!("Failed to download {url}"))?;

    let bar = transfer_bar(response.content_length(), dest);
    let partial = dest.with_extension("part");
    let mut file = File::create(&partial)
        .with_context(|| format!("Failed to create {}", partial.display()))?;

    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("Failed reading {url}"))?
    {
        file.write_all(&chunk)
            .with_context(|| format!("Failed to write {}", partial.display()))?;
        bar.inc(chunk.len() as u64);
    }
    file.flush()?;
    drop(file);

    std::fs::rename(&partial, dest)
        .with_context(|| format!("Failed to move download into {}", dest.display()))?;
    bar.finish_and_clear();

    let bytes = bar.position();
    info!(url, dest = %dest.display(), bytes, "Downloaded model file");
    Ok(bytes)
}

/// A byte bar when the size is known, a spinner otherwise.
fn transfer_bar(len: Option<u64>, dest: &Path) -> ProgressBar {
    let (bar, template) = match len {
        Some(len) => (
            ProgressBar::new(len),
            "  {msg:<16} [{wide_bar:.cyan/blue}] {bytes}/{total_bytes}",
        ),
        None => (ProgressBar::new_spinner(), "  {msg:<16} {spinner} {bytes}"),
    };
    if let Ok(style) = ProgressStyle::with_template(template) {
        bar.set_style(style);
    }
    if let Some(name) = dest.file_name() {
        bar.set_message(name.to_string_lossy().into_owned());
    }
    bar
}
