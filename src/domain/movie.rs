//! Movie domain model.
//!
//! This module defines the records the rest of the crate passes around:
//! [`MovieSummary`] for search hits, [`MovieDetail`] for the full record of a
//! selected movie, and [`WatchedEntry`] for a rated movie in the user's
//! watched collection.

use serde::{Deserialize, Serialize};

/// Highest rating a user can give.
pub const MAX_USER_RATING: u8 = 10;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// External identifier (IMDb id such as `tt0096895`).
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
}

impl MovieSummary {
    /// Creates a summary from its four fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use popcorn::domain::MovieSummary;
    ///
    /// let movie = MovieSummary::new("tt001", "Batman", "1989", "N/A");
    /// assert_eq!(movie.title, "Batman");
    /// ```
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        year: impl Into<String>,
        poster_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year: year.into(),
            poster_url: poster_url.into(),
        }
    }
}

/// Full record of a selected movie.
///
/// Numeric fields are optional because the source reports `"N/A"` for
/// unknown values. The raw text is kept alongside for display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    /// Runtime as reported, e.g. `"126 min"`.
    pub runtime: String,
    pub runtime_minutes: Option<u32>,
    /// External rating as reported, e.g. `"7.5"` or `"N/A"`.
    pub external_rating_text: String,
    /// External rating on a 0-10 scale, when numeric.
    pub external_rating: Option<f64>,
    pub plot: String,
    pub release_date: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
}

impl MovieDetail {
    /// Returns the summary part of this record.
    #[must_use]
    pub fn summary(&self) -> MovieSummary {
        MovieSummary::new(
            self.id.clone(),
            self.title.clone(),
            self.year.clone(),
            self.poster_url.clone(),
        )
    }
}

/// A movie the user has watched and rated.
///
/// Serialized with the field names of the original watched-list layout so
/// that collections written by earlier versions load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedEntry {
    #[serde(rename = "imdbID")]
    pub movie_id: String,

    #[serde(rename = "Title", default)]
    pub title: String,

    #[serde(rename = "Poster", default)]
    pub poster_url: String,

    #[serde(rename = "imdbRating", default)]
    pub external_rating: Option<f64>,

    #[serde(rename = "runtime", default)]
    pub runtime_minutes: Option<u32>,

    #[serde(rename = "userRating")]
    pub user_rating: u8,

    /// Number of times a nonzero rating was set before confirming.
    #[serde(rename = "userRatingDetails", default)]
    pub rating_revision_count: u32,
}

impl WatchedEntry {
    /// Builds an entry from a loaded detail record and the rating session.
    #[must_use]
    pub fn from_detail(detail: &MovieDetail, user_rating: u8, rating_revision_count: u32) -> Self {
        Self {
            movie_id: detail.id.clone(),
            title: detail.title.clone(),
            poster_url: detail.poster_url.clone(),
            external_rating: detail.external_rating,
            runtime_minutes: detail.runtime_minutes,
            user_rating,
            rating_revision_count,
        }
    }
}

/// Parses a runtime such as `"126 min"` into minutes.
///
/// Reads the leading run of digits after optional whitespace. Returns `None`
/// when there are none (`"N/A"`).
///
/// # Examples
///
/// ```
/// use popcorn::domain::movie::parse_runtime;
///
/// assert_eq!(parse_runtime("126 min"), Some(126));
/// assert_eq!(parse_runtime("N/A"), None);
/// ```
#[must_use]
pub fn parse_runtime(text: &str) -> Option<u32> {
    let trimmed = text.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Parses an external rating such as `"7.5"`.
///
/// Returns `None` for non-numeric or non-finite input.
#[must_use]
pub fn parse_rating(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|r| r.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_reads_leading_digits() {
        assert_eq!(parse_runtime("136 min"), Some(136));
        assert_eq!(parse_runtime("  90"), Some(90));
        assert_eq!(parse_runtime("N/A"), None);
        assert_eq!(parse_runtime(""), None);
    }

    #[test]
    fn rating_rejects_non_numeric() {
        assert_eq!(parse_rating("7.5"), Some(7.5));
        assert_eq!(parse_rating("N/A"), None);
        assert_eq!(parse_rating("NaN"), None);
    }

    #[test]
    fn watched_entry_uses_original_field_names() {
        let entry = WatchedEntry {
            movie_id: "tt002".to_string(),
            title: "Batman Returns".to_string(),
            poster_url: "N/A".to_string(),
            external_rating: Some(7.1),
            runtime_minutes: Some(126),
            user_rating: 9,
            rating_revision_count: 2,
        };
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["imdbID"], "tt002");
        assert_eq!(json["userRating"], 9);
        assert_eq!(json["userRatingDetails"], 2);
        assert_eq!(json["runtime"], 126);
    }

    #[test]
    fn watched_entry_tolerates_missing_numbers() {
        let json = r#"{"imdbID":"tt1","Title":"X","Poster":"N/A","imdbRating":null,"userRating":5}"#;
        let entry: WatchedEntry = serde_json::from_str(json).expect("deserialize");
        assert_eq!(entry.external_rating, None);
        assert_eq!(entry.runtime_minutes, None);
        assert_eq!(entry.rating_revision_count, 0);
    }
}
