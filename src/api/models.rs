//! OMDb response payloads.
//!
//! The API answers `200 OK` for both hits and misses; a miss carries
//! `"Response": "False"` and an `"Error"` message. These payloads keep the
//! API's field names and convert into domain types or a
//! [`FetchError::Domain`].

use crate::domain::movie::{parse_rating, parse_runtime};
use crate::domain::{FetchError, MovieDetail, MovieSummary};
use serde::Deserialize;

/// Top-level response for `?s=<query>`.
#[derive(Debug, Deserialize)]
pub struct SearchPayload {
    #[serde(rename = "Search", default)]
    pub search: Option<Vec<SummaryPayload>>,

    #[serde(rename = "Response", default)]
    pub response: Option<String>,

    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

/// One entry of the `Search` array.
#[derive(Debug, Deserialize)]
pub struct SummaryPayload {
    #[serde(rename = "Title", default)]
    pub title: String,

    #[serde(rename = "Year", default)]
    pub year: String,

    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,

    #[serde(rename = "Poster", default)]
    pub poster: String,
}

/// Response for `?i=<id>`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DetailPayload {
    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Year")]
    pub year: String,

    #[serde(rename = "imdbID")]
    pub imdb_id: String,

    #[serde(rename = "Poster")]
    pub poster: String,

    #[serde(rename = "Runtime")]
    pub runtime: String,

    #[serde(rename = "imdbRating")]
    pub imdb_rating: String,

    #[serde(rename = "Plot")]
    pub plot: String,

    #[serde(rename = "Released")]
    pub released: String,

    #[serde(rename = "Actors")]
    pub actors: String,

    #[serde(rename = "Director")]
    pub director: String,

    #[serde(rename = "Genre")]
    pub genre: String,

    #[serde(rename = "Response")]
    pub response: Option<String>,

    #[serde(rename = "Error")]
    pub error: Option<String>,
}

fn is_false_response(response: Option<&str>) -> bool {
    response.is_some_and(|r| r.eq_ignore_ascii_case("false"))
}

impl From<SummaryPayload> for MovieSummary {
    fn from(payload: SummaryPayload) -> Self {
        Self::new(payload.imdb_id, payload.title, payload.year, payload.poster)
    }
}

impl SearchPayload {
    /// Converts the payload into an ordered result list.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Domain`] when the API reports an error.
    pub fn into_result(self) -> Result<Vec<MovieSummary>, FetchError> {
        if let Some(error) = self.error {
            return Err(FetchError::Domain(error));
        }
        if is_false_response(self.response.as_deref()) {
            return Err(FetchError::Domain("Movie not found!".to_string()));
        }
        Ok(self
            .search
            .unwrap_or_default()
            .into_iter()
            .map(MovieSummary::from)
            .collect())
    }
}

impl DetailPayload {
    /// Converts the payload into a detail record, fixing the id to the one
    /// that was requested.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Domain`] when the API reports an error.
    pub fn into_result(self, requested_id: &str) -> Result<MovieDetail, FetchError> {
        if let Some(error) = self.error {
            return Err(FetchError::Domain(error));
        }
        if is_false_response(self.response.as_deref()) {
            return Err(FetchError::Domain("Incorrect IMDb ID.".to_string()));
        }

        Ok(MovieDetail {
            id: requested_id.to_string(),
            runtime_minutes: parse_runtime(&self.runtime),
            external_rating: parse_rating(&self.imdb_rating),
            title: self.title,
            year: self.year,
            poster_url: self.poster,
            runtime: self.runtime,
            external_rating_text: self.imdb_rating,
            plot: self.plot,
            release_date: self.released,
            actors: self.actors,
            director: self.director,
            genre: self.genre,
        })
    }
}
