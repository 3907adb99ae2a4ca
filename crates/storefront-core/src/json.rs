use serde::{Deserialize, Serialize};

/// Text that may have been cut down before being stored or sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonTruncText {
    pub text: String,
    pub truncated: bool,
}

impl JsonTruncText {
    pub fn new(text: impl Into<String>, truncated: bool) -> Self {
        Self {
            text: text.into(),
            truncated,
        }
    }

    /// Keeps at most `limit` characters of `text`.
    pub fn truncate(text: &str, limit: usize) -> Self {
        match text.char_indices().nth(limit) {
            Some((cut, _)) => Self::new(&text[..cut], true),
            None => Self::new(text, false),
        }
    }
}
