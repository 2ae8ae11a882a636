use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use topican::config::{Config, SimilarityBackend};
use topican::nlp::stopwords::EnglishStopwords;
use topican::nlp::tagger::{PosCategory, RuleTagger};
use topican::oracles::embeddings::OnnxWordEmbedder;
use topican::oracles::taxonomy::HyponymTable;
use topican::oracles::traits::{NoTaxonomy, SimilarityOracle, TaxonomicOracle};
use topican::oracles::vectors::WordVectors;
use topican::topics::analyzer::{most_common_words, most_common_words_with_preceding};
use topican::topics::seeds::load_seed_groups;
use topican::topics::{AnalysisSettings, ExclusionMode, TopicAnalyzer};

/// Topican: find what people talk about in free-text answers.
///
/// Groups the nouns in a batch of records into synonym-like topics and
/// ranks them with the words most often said about them.
#[derive(Parser)]
#[command(name = "topican", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group nouns into topics and rank them with their context words
    Analyze {
        /// Records file: JSON array, JSON lines, CSV, or plain text (one per line)
        file: PathBuf,

        /// Text field of JSON objects, or text column of a CSV file
        #[arg(long)]
        field: Option<String>,

        /// Words to exclude: "stopwords", "none", or a comma-separated list
        #[arg(long, default_value = "stopwords")]
        exclude: String,

        /// Number of groups to show (0 = all)
        #[arg(long, default_value = "10")]
        top_groups: usize,

        /// Context words per group (0 = all)
        #[arg(long, default_value = "0")]
        top_words: usize,

        /// Nouns with more hyponyms than this are too general to group (0 = no limit)
        #[arg(long, default_value = "100")]
        max_hyponyms: usize,

        /// How many levels of hyponyms to follow (0 = unbounded)
        #[arg(long, default_value = "1")]
        max_hyponym_depth: usize,

        /// Minimum similarity for two nouns to share a group
        #[arg(long, default_value = "0.7")]
        sim_threshold: f64,

        /// JSON file of user-defined groups: {"root": ["synonym", ...]}
        #[arg(long)]
        seeds: Option<PathBuf>,

        /// Report context words after a negator as not_<word>
        #[arg(long)]
        negation: bool,

        /// Count a noun as its own context when it has no other context words
        #[arg(long)]
        self_context: bool,

        /// Group by similarity alone, without a hyponym table
        #[arg(long)]
        similarity_only: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the most common words of the given parts of speech
    TopWords {
        /// Records file: JSON array, JSON lines, CSV, or plain text (one per line)
        file: PathBuf,

        /// Text field of JSON objects, or text column of a CSV file
        #[arg(long)]
        field: Option<String>,

        /// Comma-separated categories (noun, propn, verb, adj, adv, num)
        #[arg(long, default_value = "noun,propn")]
        pos: String,

        /// Number of words to show (0 = all)
        #[arg(long, default_value = "20")]
        top: usize,

        /// Words to exclude: "stopwords", "none", or a comma-separated list
        #[arg(long, default_value = "stopwords")]
        exclude: String,

        /// Also show the words that most often come right before each word
        #[arg(long)]
        with_preceding: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download the ONNX word-embedding model (~90 MB)
    DownloadModel,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topican=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            field,
            exclude,
            top_groups,
            top_words,
            max_hyponyms,
            max_hyponym_depth,
            sim_threshold,
            seeds,
            negation,
            self_context,
            similarity_only,
            json,
        } => {
            let config = Config::load()?;
            config.require_similarity()?;

            let seed_groups = match &seeds {
                Some(path) => load_seed_groups(path)?,
                None => Vec::new(),
            };
            let settings = AnalysisSettings {
                exclusion: exclude.parse::<ExclusionMode>()?,
                top_n_noun_groups: top_groups,
                top_n_words: top_words,
                max_hyponyms,
                max_hyponym_depth,
                sim_threshold,
                negation_context: negation,
                self_context,
                seed_groups,
            };
            // Fail on bad flags before loading large resources.
            settings.validate()?;

            let tagger = build_tagger(&config)?;
            let taxonomy = load_taxonomy(&config, similarity_only)?;
            let similarity = load_similarity(&config)?;
            let records = topican::input::load_records(&file, field.as_deref())?;

            let analyzer = TopicAnalyzer::new(
                &tagger,
                taxonomy.as_ref(),
                similarity.as_ref(),
                &EnglishStopwords,
            );
            let result = analyzer.analyze(&records, &display_name(&file), &settings)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                topican::output::terminal::display_ranked_result(&result);
            }
        }

        Commands::TopWords {
            file,
            field,
            pos,
            top,
            exclude,
            with_preceding,
            json,
        } => {
            let config = Config::load()?;
            let categories = pos
                .split(',')
                .map(|p| p.parse::<PosCategory>())
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let exclusion = exclude.parse::<ExclusionMode>()?;

            let tagger = build_tagger(&config)?;
            let records = topican::input::load_records(&file, field.as_deref())?;
            let title = format!("Most common {} in {}", pos, display_name(&file));

            if with_preceding {
                let words = most_common_words_with_preceding(
                    &tagger,
                    &EnglishStopwords,
                    &records,
                    &categories,
                    &exclusion,
                    top,
                )?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&words)?);
                } else {
                    topican::output::terminal::display_words_with_preceding(&title, &words);
                }
            } else {
                let words = most_common_words(
                    &tagger,
                    &EnglishStopwords,
                    &records,
                    &categories,
                    &exclusion,
                    top,
                )?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&words)?);
                } else {
                    topican::output::terminal::display_word_counts(&title, &words);
                }
            }
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading ONNX model...");
            println!("  Destination: {}", model_dir.display());

            topican::oracles::download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now set TOPICAN_SIMILARITY=onnx and run `topican analyze`.");
        }
    }

    Ok(())
}

fn build_tagger(config: &Config) -> Result<RuleTagger> {
    let tagger = RuleTagger::new();
    match &config.lexicon_path {
        Some(path) => Ok(tagger.with_lexicon(RuleTagger::load_lexicon(path)?)),
        None => Ok(tagger),
    }
}

fn load_taxonomy(config: &Config, similarity_only: bool) -> Result<Box<dyn TaxonomicOracle>> {
    if similarity_only {
        info!("Similarity-only run, skipping the hyponym table");
        return Ok(Box::new(NoTaxonomy));
    }
    let path = config.require_taxonomy()?;
    let table = HyponymTable::load(path)
        .with_context(|| format!("Failed to load hyponym table {}", path.display()))?;
    Ok(Box::new(table))
}

fn load_similarity(config: &Config) -> Result<Box<dyn SimilarityOracle>> {
    match config.similarity_backend {
        SimilarityBackend::Vectors => {
            let path = config
                .vectors_path
                .as_deref()
                .context("TOPICAN_VECTORS not set")?;
            Ok(Box::new(WordVectors::load(path)?))
        }
        SimilarityBackend::Onnx => {
            let dir = topican::oracles::download::embedding_model_dir(&config.model_dir);
            Ok(Box::new(OnnxWordEmbedder::load(&dir)?))
        }
    }
}

/// File stem used as the run's name in reports.
fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
