//! slot-intent: turning a spoken card-slot command into structured arguments
//!
//! The pipeline is keyword/embedding intent classification, followed by
//! pattern-based argument extraction, followed by synonym canonicalization of
//! the extracted item names. The embedding model is an injected collaborator
//! behind [`EmbeddingProvider`].

mod canonical;
pub use canonical::{default_synonym_groups, Canonicalizer};

mod embedding;
pub use embedding::{cosine_similarity, EmbeddingError, EmbeddingProvider, HashingEmbedder};

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::MockEmbeddingProvider;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::HttpEmbeddingProvider;

mod classifier;
pub use classifier::{
    default_templates, Classification, ClassifyError, IntentClassifier, IntentTemplate,
};

mod parser;
pub use parser::{BatchArgs, CommandParser, ParseError, ParsedArgs};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Keyword that marks a save command ("store").
pub const SAVE_KEYWORD: &str = "저장";
/// Keyword that marks a delete command.
pub const DELETE_KEYWORD: &str = "삭제";
/// Keyword that marks a move (retrieve) command.
pub const MOVE_KEYWORD: &str = "이동";

/// High-level action requested by an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Save,
    Delete,
    Move,
    Unknown,
}

impl Intent {
    /// Intents in keyword priority order.
    pub const ORDERED: [Intent; 3] = [Intent::Save, Intent::Delete, Intent::Move];

    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Intent::Save => Some(SAVE_KEYWORD),
            Intent::Delete => Some(DELETE_KEYWORD),
            Intent::Move => Some(MOVE_KEYWORD),
            Intent::Unknown => None,
        }
    }

    /// First intent whose keyword is contained in `text`, in priority order.
    pub fn from_keywords(text: &str) -> Option<Intent> {
        Self::ORDERED
            .into_iter()
            .find(|intent| intent.keyword().is_some_and(|kw| text.contains(kw)))
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::Save => "save",
            Intent::Delete => "delete",
            Intent::Move => "move",
            Intent::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_priority_prefers_save() {
        assert_eq!(Intent::from_keywords("저장 삭제 이동"), Some(Intent::Save));
        assert_eq!(Intent::from_keywords("롯데카드 삭제 이동"), Some(Intent::Delete));
        assert_eq!(Intent::from_keywords("롯데카드 이동"), Some(Intent::Move));
        assert_eq!(Intent::from_keywords("롯데카드 꺼내줘"), None);
    }

    #[test]
    fn unknown_has_no_keyword() {
        assert_eq!(Intent::Unknown.keyword(), None);
        assert_eq!(Intent::Save.to_string(), "save");
    }
}
