//! Argument extraction for classified commands

use crate::{Canonicalizer, Intent, DELETE_KEYWORD, MOVE_KEYWORD, SAVE_KEYWORD};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no slot number found")]
    MissingSlotNumber,
    #[error("no item name found")]
    MissingItemName,
    #[error("no recognizable item in command")]
    UnrecognizedItem,
}

/// Arguments of a single-item command. Item names are raw surface forms;
/// canonicalization happens in the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "lowercase")]
pub enum ParsedArgs {
    Save { item: String, slot: u32 },
    Delete { item: String },
    Move { item: String },
}

impl ParsedArgs {
    pub fn item(&self) -> &str {
        match self {
            ParsedArgs::Save { item, .. }
            | ParsedArgs::Delete { item }
            | ParsedArgs::Move { item } => item,
        }
    }

    pub fn intent(&self) -> Intent {
        match self {
            ParsedArgs::Save { .. } => Intent::Save,
            ParsedArgs::Delete { .. } => Intent::Delete,
            ParsedArgs::Move { .. } => Intent::Move,
        }
    }
}

/// Arguments of a multi-item command, canonicalized, in order of first mention.
///
/// Delete entries carry the placeholder slot `0`: the batch form never reads
/// a slot number for deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchArgs {
    pub intent: Intent,
    pub entries: Vec<(String, u32)>,
}

impl BatchArgs {
    fn new(intent: Intent) -> Self {
        Self {
            intent,
            entries: Vec::new(),
        }
    }

    /// Insert or overwrite, keeping the position of its first mention.
    fn upsert(&mut self, item: String, slot: u32) {
        match self.entries.iter_mut().find(|(name, _)| *name == item) {
            Some(entry) => entry.1 = slot,
            None => self.entries.push((item, slot)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn digit_run() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("Invalid regex pattern - this is a bug"))
}

struct BatchPatterns {
    save: Regex,
    delete: Regex,
    run_before_move: Regex,
    item_slot_pair: Regex,
}

impl BatchPatterns {
    fn new(items: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            save: Regex::new(&format!(r"({items})\s*([0-9]+)\s*{SAVE_KEYWORD}"))?,
            delete: Regex::new(&format!(r"({items})\s*{DELETE_KEYWORD}"))?,
            run_before_move: Regex::new(&format!(r"((?:{items})\s*[0-9]+\s*)+{MOVE_KEYWORD}"))?,
            item_slot_pair: Regex::new(&format!(r"({items})\s*([0-9]+)"))?,
        })
    }
}

/// Pattern-based parser over a closed item vocabulary.
pub struct CommandParser {
    canonicalizer: Canonicalizer,
    /// `None` when the vocabulary is empty.
    batch: Option<BatchPatterns>,
}

impl CommandParser {
    /// Builds the batch patterns from the canonicalizer's surface forms.
    pub fn new(canonicalizer: Canonicalizer) -> Result<Self, regex::Error> {
        let alternation = canonicalizer
            .surface_forms()
            .iter()
            .map(|form| regex::escape(form))
            .collect::<Vec<_>>()
            .join("|");
        let batch = if alternation.is_empty() {
            None
        } else {
            Some(BatchPatterns::new(&alternation)?)
        };
        Ok(Self {
            canonicalizer,
            batch,
        })
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// Parse a single-item command.
    pub fn parse(&self, intent: Intent, text: &str) -> Result<ParsedArgs, ParseError> {
        match intent {
            Intent::Save => {
                let content = text.replace(SAVE_KEYWORD, "");
                let content = content.trim();
                let m = digit_run()
                    .find(content)
                    .ok_or(ParseError::MissingSlotNumber)?;
                // Slots are numbered from 1.
                let slot = m
                    .as_str()
                    .parse::<u32>()
                    .ok()
                    .filter(|slot| *slot > 0)
                    .ok_or(ParseError::MissingSlotNumber)?;
                let item = content[..m.start()].trim();
                if item.is_empty() {
                    return Err(ParseError::MissingItemName);
                }
                Ok(ParsedArgs::Save {
                    item: item.to_string(),
                    slot,
                })
            }
            Intent::Delete => {
                let item = non_empty(text.replace(DELETE_KEYWORD, "").trim())?;
                Ok(ParsedArgs::Delete { item })
            }
            Intent::Move => {
                // Without the keyword (embedding-classified) this is the whole text.
                let item = non_empty(text.replace(MOVE_KEYWORD, "").trim())?;
                Ok(ParsedArgs::Move { item })
            }
            Intent::Unknown => Err(ParseError::UnrecognizedItem),
        }
    }

    /// Parse the multi-item form, e.g. "롯데카드 1 민증 2 저장".
    ///
    /// The pattern is picked by keyword presence (save, delete, move) and only
    /// falls back to `intent` when no keyword appears in the text.
    pub fn parse_batch(&self, intent: Intent, text: &str) -> Result<BatchArgs, ParseError> {
        let selected = Intent::from_keywords(text).unwrap_or(intent);
        let patterns = self.batch.as_ref().ok_or(ParseError::UnrecognizedItem)?;
        let mut out = BatchArgs::new(selected);
        match selected {
            Intent::Save => {
                for caps in patterns.save.captures_iter(text) {
                    let slot = caps
                        .get(2)
                        .and_then(|m| m.as_str().parse::<u32>().ok())
                        .filter(|slot| *slot > 0);
                    if let (Some(item), Some(slot)) = (caps.get(1), slot) {
                        out.upsert(self.canonicalizer.canonicalize(item.as_str()), slot);
                    }
                }
            }
            Intent::Delete => {
                for caps in patterns.delete.captures_iter(text) {
                    if let Some(item) = caps.get(1) {
                        out.upsert(self.canonicalizer.canonicalize(item.as_str()), 0);
                    }
                }
            }
            Intent::Move => {
                if let Some(run) = patterns.run_before_move.find(text) {
                    for caps in patterns.item_slot_pair.captures_iter(run.as_str()) {
                        let slot = caps
                            .get(2)
                            .and_then(|m| m.as_str().parse::<u32>().ok());
                        if let (Some(item), Some(slot)) = (caps.get(1), slot) {
                            out.upsert(self.canonicalizer.canonicalize(item.as_str()), slot);
                        }
                    }
                }
            }
            Intent::Unknown => {}
        }
        if out.is_empty() {
            return Err(ParseError::UnrecognizedItem);
        }
        Ok(out)
    }
}

fn non_empty(s: &str) -> Result<String, ParseError> {
    if s.is_empty() {
        Err(ParseError::MissingItemName)
    } else {
        Ok(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> CommandParser {
        CommandParser::new(Canonicalizer::default()).unwrap()
    }

    #[test]
    fn save_extracts_name_before_first_number() {
        let p = parser();
        assert_eq!(
            p.parse(Intent::Save, "저장 롯데카드 3").unwrap(),
            ParsedArgs::Save {
                item: "롯데카드".into(),
                slot: 3
            }
        );
        // Keyword may trail, and only the first digit run counts.
        assert_eq!(
            p.parse(Intent::Save, "민증 12번 7 저장").unwrap(),
            ParsedArgs::Save {
                item: "민증".into(),
                slot: 12
            }
        );
    }

    #[test]
    fn save_without_number_or_name_fails_specifically() {
        let p = parser();
        assert_eq!(
            p.parse(Intent::Save, "저장 롯데카드"),
            Err(ParseError::MissingSlotNumber)
        );
        assert_eq!(p.parse(Intent::Save, "저장 3"), Err(ParseError::MissingItemName));
        assert_eq!(
            p.parse(Intent::Save, "저장 카드 99999999999"),
            Err(ParseError::MissingSlotNumber)
        );
    }

    #[test]
    fn slot_zero_is_not_a_slot() {
        let p = parser();
        assert_eq!(
            p.parse(Intent::Save, "저장 롯데카드 0"),
            Err(ParseError::MissingSlotNumber)
        );
        assert_eq!(
            p.parse(Intent::Save, "저장 롯데카드 007").unwrap(),
            ParsedArgs::Save {
                item: "롯데카드".into(),
                slot: 7
            }
        );
        let args = p.parse_batch(Intent::Save, "롯데카드 0 저장 민증 2 저장").unwrap();
        assert_eq!(args.entries, vec![("주민등록증".to_string(), 2)]);
        assert_eq!(
            p.parse_batch(Intent::Save, "롯데카드 0 저장"),
            Err(ParseError::UnrecognizedItem)
        );
    }

    #[test]
    fn delete_and_move_take_remaining_text() {
        let p = parser();
        assert_eq!(
            p.parse(Intent::Delete, "삭제 삼성 ").unwrap(),
            ParsedArgs::Delete {
                item: "삼성".into()
            }
        );
        assert_eq!(
            p.parse(Intent::Move, " 롯데카드 ").unwrap(),
            ParsedArgs::Move {
                item: "롯데카드".into()
            }
        );
        assert_eq!(p.parse(Intent::Delete, "삭제"), Err(ParseError::MissingItemName));
        assert_eq!(p.parse(Intent::Move, "   "), Err(ParseError::MissingItemName));
        assert_eq!(p.parse(Intent::Unknown, "x"), Err(ParseError::UnrecognizedItem));
    }

    #[test]
    fn move_strips_only_its_keyword() {
        let p = parser();
        assert_eq!(p.parse(Intent::Move, "이동 롯데카드").unwrap().item(), "롯데카드");
        assert_eq!(p.parse(Intent::Move, "롯데카드 꺼내줘").unwrap().item(), "롯데카드 꺼내줘");
        assert_eq!(p.parse(Intent::Move, "이동"), Err(ParseError::MissingItemName));
    }

    #[test]
    fn batch_save_collects_every_pair() {
        let p = parser();
        let args = p.parse_batch(Intent::Save, "롯데 1 저장 민증 2 저장").unwrap();
        assert_eq!(args.intent, Intent::Save);
        assert_eq!(
            args.entries,
            vec![("롯데카드".to_string(), 1), ("주민등록증".to_string(), 2)]
        );
    }

    #[test]
    fn batch_save_allows_shared_slot_numbers() {
        // Two items on one slot are accepted as-is; nothing enforces uniqueness.
        let p = parser();
        let args = p.parse_batch(Intent::Save, "롯데카드 1 저장 삼성카드 1 저장").unwrap();
        assert_eq!(args.entries.len(), 2);
        assert!(args.entries.iter().all(|(_, slot)| *slot == 1));
    }

    #[test]
    fn batch_delete_uses_placeholder_slot_zero() {
        let p = parser();
        let args = p.parse_batch(Intent::Delete, "롯데카드 삭제 삼성 삭제").unwrap();
        assert_eq!(
            args.entries,
            vec![("롯데카드".to_string(), 0), ("삼성카드".to_string(), 0)]
        );
    }

    #[test]
    fn batch_move_reads_pairs_before_keyword() {
        let p = parser();
        let args = p
            .parse_batch(Intent::Move, "롯데카드 1 민증 2 삼성카드 3 이동")
            .unwrap();
        assert_eq!(args.intent, Intent::Move);
        assert_eq!(args.entries.len(), 3);
        assert_eq!(args.entries[2], ("삼성카드".to_string(), 3));
    }

    #[test]
    fn batch_with_no_match_is_a_parse_failure() {
        let p = parser();
        assert_eq!(
            p.parse_batch(Intent::Save, "신한카드 1 저장"),
            Err(ParseError::UnrecognizedItem)
        );
        assert_eq!(
            p.parse_batch(Intent::Move, "그냥 꺼내줘"),
            Err(ParseError::UnrecognizedItem)
        );
    }

    #[test]
    fn keyword_in_text_overrides_intent_for_batch() {
        let p = parser();
        let args = p.parse_batch(Intent::Move, "민증 4 저장").unwrap();
        assert_eq!(args.intent, Intent::Save);
    }

    #[test]
    fn empty_vocabulary_matches_nothing() {
        let p = CommandParser::new(Canonicalizer::new(vec![])).unwrap();
        assert_eq!(
            p.parse_batch(Intent::Save, "롯데카드 1 저장"),
            Err(ParseError::UnrecognizedItem)
        );
    }
}
