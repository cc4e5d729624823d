//! Autosuggest ranking over a listing snapshot.
//!
//! Each field owns a band of 100 scores. A match scores `band` when the field
//! starts with the query and `band + position` otherwise, with the position
//! clamped below the band width so a title match always outranks a code
//! match, and so on down the field list.
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::model::PropertyListing;

pub const DEFAULT_MAX_RESULTS: usize = 10;
const BAND_WIDTH: usize = 100;
const ADDRESS_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SuggestionField {
    Title,
    Code,
    Project,
    Address,
    Agent,
}

impl SuggestionField {
    pub const ALL: [SuggestionField; 5] = [
        Self::Title,
        Self::Code,
        Self::Project,
        Self::Address,
        Self::Agent,
    ];

    pub fn band(&self) -> usize {
        BAND_WIDTH
            * match self {
                Self::Title => 0,
                Self::Code => 1,
                Self::Project => 2,
                Self::Address => 3,
                Self::Agent => 4,
            }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Code => "Code",
            Self::Project => "Project",
            Self::Address => "Address",
            Self::Agent => "Agent",
        }
    }

    fn value<'a>(&self, listing: &'a PropertyListing) -> Option<&'a str> {
        match self {
            Self::Title => Some(listing.property.title.as_str()),
            Self::Code => listing.property.property_code.as_deref(),
            Self::Project => listing.project_name(),
            Self::Address => listing.property.address.as_deref(),
            Self::Agent => listing.agent_name(),
        }
    }
}

impl fmt::Display for SuggestionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub text: String,
    pub field: SuggestionField,
    #[serde(skip)]
    pub score: usize,
}

impl Suggestion {
    pub fn label(&self) -> &'static str {
        self.field.label()
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

/// Score of `value` against an already lower-cased query, or `None` when it does not match.
fn score(field: SuggestionField, value: &str, query: &str) -> Option<usize> {
    let lowered = value.to_lowercase();
    let pos = lowered.find(query)?;
    let offset = if pos == 0 {
        0
    } else {
        // char position, not byte offset
        lowered[..pos].chars().count().clamp(1, BAND_WIDTH - 1)
    };
    Some(field.band() + offset)
}

/// Ranked suggestions for `query`, at most `max_results` of them.
pub fn suggest<'a, I>(records: I, query: &str, max_results: usize) -> Vec<Suggestion>
where
    I: IntoIterator<Item = &'a PropertyListing>,
{
    let query = query.trim().to_lowercase();
    if query.is_empty() || max_results == 0 {
        return Vec::new();
    }

    // Truncated addresses can collide; the best score wins.
    let mut best: HashMap<(SuggestionField, String), usize> = HashMap::new();
    for listing in records {
        for field in SuggestionField::ALL {
            let Some(value) = field.value(listing) else {
                continue;
            };
            let Some(score) = score(field, value, &query) else {
                continue;
            };
            let text = match field {
                SuggestionField::Address => truncate_chars(value, ADDRESS_PREVIEW_CHARS),
                _ => value.to_string(),
            };
            best.entry((field, text))
                .and_modify(|s| *s = (*s).min(score))
                .or_insert(score);
        }
    }

    let mut out: Vec<Suggestion> = best
        .into_iter()
        .map(|((field, text), score)| Suggestion { text, field, score })
        .collect();

    // Total order: identical inputs rank identically whatever the record order.
    out.sort_by(|a, b| {
        a.score
            .cmp(&b.score)
            .then_with(|| a.text.cmp(&b.text))
            .then_with(|| a.field.cmp(&b.field))
    });
    out.truncate(max_results);
    out
}
