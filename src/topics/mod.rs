// Noun grouping and context aggregation.
//
// Observations flow through exclusion, an ordered list of placement
// strategies, context aggregation and ranking. The analyzer drives the whole
// pipeline; the other modules are usable on their own.

pub mod analyzer;
pub mod cache;
pub mod exclusion;
pub mod group;
pub mod grouping;
pub mod observation;
pub mod report;
pub mod seeds;
pub mod strategy;

pub use analyzer::{AnalysisSettings, TopicAnalyzer};
pub use exclusion::ExclusionMode;
pub use observation::{Observation, Record};
pub use report::{RankedGroup, RankedResult, WordCount, WordWithPreceding};
pub use seeds::SeedGroup;
