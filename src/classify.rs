//! Category detection over the ordered keyword table.

use record_types::{Category, EatKind};
use serde::Serialize;
use tracing::debug;

use crate::keywords::{Branch, KEYWORD_TABLE, MILK_KEYWORDS};

/// Outcome of keyword detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: Category,
    /// Milk vs. food, only for `Eat`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eat_kind: Option<EatKind>,
    /// The keyword that decided, `None` for the `General` fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<&'static str>,
}

impl Classification {
    pub const GENERAL: Classification = Classification {
        category: Category::General,
        eat_kind: None,
        keyword: None,
    };

    pub fn matched(&self) -> bool {
        self.keyword.is_some()
    }

    /// Build a classification for a category decided elsewhere (e.g. by
    /// the annotator), filling in the eat sub-kind from the text.
    pub fn for_category(category: Category, text: &str) -> Self {
        let eat_kind = (category == Category::Eat).then(|| eat_kind_of(text));
        Classification {
            category,
            eat_kind,
            keyword: None,
        }
    }

    /// Label used in the confirmation message ("吃奶" rather than "吃饭").
    pub fn message_label(&self) -> &'static str {
        match self.eat_kind {
            Some(k) => k.label(),
            None => self.category.label(),
        }
    }
}

/// Detect the activity category of `text`.
///
/// Walks the keyword table in order and stops at the first row with a
/// keyword present. ASCII letters compare case-insensitively ("dha").
pub fn classify(text: &str) -> Classification {
    let folded = text.to_ascii_lowercase();
    for rule in KEYWORD_TABLE {
        if let Some(kw) = first_present(&folded, rule.keywords) {
            debug!(keyword = kw, category = rule.branch.category().as_code(), "classified");
            return from_branch(rule.branch, kw);
        }
    }
    debug!("no category keyword, falling back to general");
    Classification::GENERAL
}

/// Milk if any milk keyword is present, otherwise food.
pub fn eat_kind_of(text: &str) -> EatKind {
    if first_present(&text.to_ascii_lowercase(), MILK_KEYWORDS).is_some() {
        EatKind::Milk
    } else {
        EatKind::Food
    }
}

fn first_present(folded: &str, keywords: &'static [&'static str]) -> Option<&'static str> {
    keywords
        .iter()
        .copied()
        .find(|kw| folded.contains(kw.to_ascii_lowercase().as_str()))
}

fn from_branch(branch: Branch, keyword: &'static str) -> Classification {
    Classification {
        category: branch.category(),
        eat_kind: branch.eat_kind(),
        keyword: Some(keyword),
    }
}
