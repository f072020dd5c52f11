//! Historical incident and playbook search
//!
//! Matches are ranked by distance (0 = identical); anything above the
//! configured threshold is reported as low confidence.

mod lexical;
mod types;

pub use lexical::{KnowledgeCorpus, KnowledgeDocument, KnowledgeError, LexicalKnowledgeBase};
pub use types::{
    Confidence, GuidanceResult, KbItem, KbMatch, KbSearchResult, KnowledgeBase, format_matches,
};
