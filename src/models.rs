use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::{ParserError, Result};

/// Rating value used when the site shows no usable score.
pub const RATING_UNKNOWN: f32 = -1.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Manga {
    pub id: i64,
    pub url: String,
    pub public_url: String,
    pub cover_url: Option<String>,
    pub title: String,
    pub alt_titles: BTreeSet<String>,
    /// Fraction in `0.0..=1.0`, or [`RATING_UNKNOWN`].
    pub rating: f32,
    pub tags: BTreeSet<MangaTag>,
    pub authors: BTreeSet<String>,
    pub state: Option<MangaState>,
    pub content_rating: Option<ContentRating>,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MangaTag {
    pub key: String,
    pub title: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MangaChapter {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub number: f32,
    pub volume: i32,
    pub branch: Option<String>,
    pub upload_date: Option<DateTime<Utc>>,
    pub scanlator: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MangaPage {
    pub id: i64,
    pub url: String,
    pub preview: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MangaState {
    Ongoing,
    Finished,
    Abandoned,
    Paused,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentRating {
    Safe,
    Suggestive,
    Adult,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    Updated,
    Popularity,
    Rating,
    Newest,
    Alphabetical,
}

impl FromStr for SortOrder {
    type Err = ParserError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "updated" | "latest" => Ok(SortOrder::Updated),
            "popularity" | "popular" => Ok(SortOrder::Popularity),
            "rating" => Ok(SortOrder::Rating),
            "newest" | "new" => Ok(SortOrder::Newest),
            "alphabetical" | "alpha" => Ok(SortOrder::Alphabetical),
            other => Err(ParserError::precondition(format!("unknown sort order '{}'", other))),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Updated => write!(f, "updated"),
            SortOrder::Popularity => write!(f, "popularity"),
            SortOrder::Rating => write!(f, "rating"),
            SortOrder::Newest => write!(f, "newest"),
            SortOrder::Alphabetical => write!(f, "alphabetical"),
        }
    }
}

impl std::fmt::Display for MangaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MangaState::Ongoing => write!(f, "Ongoing"),
            MangaState::Finished => write!(f, "Finished"),
            MangaState::Abandoned => write!(f, "Abandoned"),
            MangaState::Paused => write!(f, "Paused"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MangaListFilter {
    pub query: Option<String>,
    pub tags: BTreeSet<MangaTag>,
}

impl MangaListFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            tags: BTreeSet::new(),
        }
    }

    pub fn tag(tag: MangaTag) -> Self {
        Self {
            query: None,
            tags: BTreeSet::from([tag]),
        }
    }

    /// Non-empty search text, if any.
    pub fn search_query(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }

    /// The single selected tag. More than one tag is rejected instead of narrowed.
    pub fn one_tag(&self) -> Result<Option<&MangaTag>> {
        if self.tags.len() > 1 {
            return Err(ParserError::precondition(format!(
                "only one tag filter is supported, got {}",
                self.tags.len()
            )));
        }
        Ok(self.tags.iter().next())
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FilterOptions {
    pub available_tags: BTreeSet<MangaTag>,
    pub available_states: BTreeSet<MangaState>,
    pub available_content_rating: BTreeSet<ContentRating>,
    pub available_sort_orders: BTreeSet<SortOrder>,
}

/// Stable identifier for an entity of `source` located at `url`.
pub fn generate_uid(source: &str, url: &str) -> i64 {
    let mut h: i64 = 1125899906842597;
    for c in source.encode_utf16().chain(url.encode_utf16()) {
        h = h.wrapping_mul(31).wrapping_add(i64::from(c));
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(key: &str) -> MangaTag {
        MangaTag {
            key: key.to_string(),
            title: key.to_string(),
            source: "MANGAPURE".to_string(),
        }
    }

    #[test]
    fn uid_is_a_pure_function_of_source_and_url() {
        let a = generate_uid("MANGAPURE", "/manga/solo-leveling/");
        let b = generate_uid("MANGAPURE", "/manga/solo-leveling/");
        assert_eq!(a, b);
        assert_ne!(a, generate_uid("MANGAPURE", "/manga/solo-leveling-2/"));
        assert_ne!(a, generate_uid("OTHER", "/manga/solo-leveling/"));
    }

    #[test]
    fn uid_of_empty_input_is_the_seed() {
        assert_eq!(generate_uid("", ""), 1125899906842597);
        assert_eq!(generate_uid("", "a"), 1125899906842597_i64.wrapping_mul(31) + 97);
    }

    #[test]
    fn one_tag_rejects_multiple_selections() {
        let mut filter = MangaListFilter::tag(tag("action"));
        assert_eq!(filter.one_tag().unwrap().map(|t| t.key.as_str()), Some("action"));

        filter.tags.insert(tag("drama"));
        let err = filter.one_tag().unwrap_err();
        assert!(matches!(err, ParserError::Precondition(_)));
    }

    #[test]
    fn empty_query_is_not_a_search() {
        assert_eq!(MangaListFilter::query("").search_query(), None);
        assert_eq!(MangaListFilter::query("one piece").search_query(), Some("one piece"));
        assert_eq!(MangaListFilter::default().search_query(), None);
    }

    #[test]
    fn sort_order_parses_cli_aliases() {
        assert_eq!("popular".parse::<SortOrder>().unwrap(), SortOrder::Popularity);
        assert_eq!("LATEST".parse::<SortOrder>().unwrap(), SortOrder::Updated);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
