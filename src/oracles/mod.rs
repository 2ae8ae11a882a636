// Lexical oracles: taxonomy and similarity backends behind swap-ready traits.

pub mod download;
pub mod embeddings;
pub mod taxonomy;
pub mod traits;
pub mod vectors;
