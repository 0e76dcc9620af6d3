//! Conversion between the persisted category string and its parsed form.
//!
//! The persisted form is a single string: `""`, `"<Category>"` or
//! `"<Category> > <Subcategory>"`. Anything that does not line up with the
//! taxonomy decodes to free text rather than failing.

use serde::{Deserialize, Serialize};

use crate::taxonomy::{Taxonomy, TransactionKind};

/// Separator between category and subcategory in an encoded value.
pub const DELIMITER: &str = " > ";

/// Subcategory sentinel meaning "free text under the chosen category".
pub const OTHER_SUBCATEGORY: &str = "other";

/// Decomposed category value.
///
/// `custom_text` carries the whole value when `category` is empty, or the
/// free-text suffix when `subcategory` is [`OTHER_SUBCATEGORY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedValue {
    pub category: String,
    pub subcategory: String,
    pub custom_text: String,
}

impl ParsedValue {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn with_subcategory(
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
            custom_text: String::new(),
        }
    }

    pub fn other(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: OTHER_SUBCATEGORY.to_string(),
            custom_text: text.into(),
        }
    }

    pub fn custom(text: impl Into<String>) -> Self {
        Self {
            custom_text: text.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_empty() && self.subcategory.is_empty() && self.custom_text.is_empty()
    }

    pub fn is_other_subcategory(&self) -> bool {
        self.subcategory == OTHER_SUBCATEGORY
    }

    pub fn encode(&self) -> String {
        encode(self)
    }
}

/// Parses `value` against the categories of `kind`.
pub fn decode(taxonomy: &Taxonomy, kind: TransactionKind, value: &str) -> ParsedValue {
    if value.is_empty() {
        return ParsedValue::empty();
    }

    if let Some((head, tail)) = value.split_once(DELIMITER) {
        return match taxonomy.category(kind, head) {
            None => ParsedValue::custom(value),
            Some(def) if def.contains_subcategory(tail) => {
                ParsedValue::with_subcategory(head, tail)
            }
            Some(_) => ParsedValue::other(head, tail),
        };
    }

    if taxonomy.has_category(kind, value) {
        return ParsedValue::category(value);
    }

    match taxonomy.owner_of_subcategory(kind, value) {
        Some(owner) => ParsedValue::with_subcategory(owner.name.clone(), value),
        None => ParsedValue::custom(value),
    }
}

/// Builds the persisted string for `parsed`. Incomplete selections (an
/// "other" subcategory without text) encode to `""`.
pub fn encode(parsed: &ParsedValue) -> String {
    if parsed.category.is_empty() {
        return parsed.custom_text.trim().to_string();
    }

    if parsed.subcategory.is_empty() {
        return parsed.category.clone();
    }

    if parsed.is_other_subcategory() {
        let text = parsed.custom_text.trim();
        if text.is_empty() {
            return String::new();
        }
        return join(&parsed.category, text);
    }

    join(&parsed.category, &parsed.subcategory)
}

pub(crate) fn join(category: &str, subcategory: &str) -> String {
    format!("{category}{DELIMITER}{subcategory}")
}
