// Topican: noun grouping and context aggregation for free-text records.
//
// This is the library root. `topics` is the grouping core; `nlp` and
// `oracles` hold the collaborators it is driven through (tagger, stop words,
// taxonomy, similarity); `input`, `output` and `config` serve the CLI.

pub mod config;
pub mod error;
pub mod input;
pub mod nlp;
pub mod oracles;
pub mod output;
pub mod topics;
