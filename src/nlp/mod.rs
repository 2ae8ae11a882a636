// NLP collaborators: tagging and stop words.
//
// The grouping core only sees the Tagger and StopwordSource traits. The
// implementations here are lightweight defaults for the CLI; any tagger that
// can produce lemmas, categories and sentence indices can be plugged in.

pub mod stopwords;
pub mod tagger;
