//! Film records: the raw tabular row, the indexable record, and the search hit.
//!
//! Conversions in this module never fail. A numeric or date field that does
//! not parse is replaced by its default (`0`, `0.0`, or an unknown date) and
//! the record is kept.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::{Document, FieldOption, FieldValue, Schema};

pub const ID_FIELD: &str = "id";
pub const TITLE_FIELD: &str = "title";
pub const OVERVIEW_FIELD: &str = "overview";
pub const TAGLINE_FIELD: &str = "tagline";
pub const RUNTIME_FIELD: &str = "runtime";
pub const REVENUE_FIELD: &str = "revenue";
pub const VOTE_AVERAGE_FIELD: &str = "vote_average";
pub const RELEASE_DATE_FIELD: &str = "release_date";
/// Title, tagline and overview joined; searchable but never returned.
pub const COMBINED_TEXT_FIELD: &str = "combined_text";

/// Stored form of release dates; sorts chronologically as a plain string.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// One row as it comes out of the source table, every field still a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFilmRecord {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Overview")]
    pub overview: String,
    #[serde(alias = "Runtime")]
    pub runtime: String,
    #[serde(alias = "Tagline")]
    pub tagline: String,
    #[serde(alias = "Revenue")]
    pub revenue: String,
    #[serde(alias = "VoteAverage")]
    pub vote_average: String,
    #[serde(alias = "ReleaseDate")]
    pub release_date: String,
}

/// A film ready to be indexed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmRecord {
    pub id: String,
    pub title: String,
    pub overview: String,
    pub tagline: String,
    /// Minutes; `0` when unknown.
    pub runtime: i32,
    pub revenue: i64,
    /// `0.0` to `10.0`; `0.0` when unknown.
    pub vote_average: f64,
    pub release_date: Option<NaiveDate>,
}

impl FilmRecord {
    /// Convert a raw row, substituting defaults for unparsable fields.
    pub fn from_raw(raw: RawFilmRecord) -> Self {
        let runtime = parse_or_default(&raw.id, RUNTIME_FIELD, &raw.runtime);
        let revenue = parse_or_default(&raw.id, REVENUE_FIELD, &raw.revenue);
        let vote_average = finite_or_zero(parse_or_default(
            &raw.id,
            VOTE_AVERAGE_FIELD,
            &raw.vote_average,
        ));
        let release_date = parse_date(&raw.release_date);
        if release_date.is_none() && !raw.release_date.trim().is_empty() {
            debug!(
                "film {}: unparsable {RELEASE_DATE_FIELD} {:?}, treating as unknown",
                raw.id, raw.release_date
            );
        }

        FilmRecord {
            id: raw.id,
            title: raw.title,
            overview: raw.overview,
            tagline: raw.tagline,
            runtime,
            revenue,
            vote_average,
            release_date,
        }
    }

    /// Text that feeds the inverted index.
    pub fn combined_text(&self) -> String {
        [
            self.title.as_str(),
            self.tagline.as_str(),
            self.overview.as_str(),
        ]
        .join(" ")
    }

    /// The document written to the index. The combined text is rebuilt here
    /// on every call.
    pub fn to_document(&self) -> Document {
        Document::builder()
            .add_keyword(ID_FIELD, self.id.clone())
            .add_text(TITLE_FIELD, self.title.clone())
            .add_text(OVERVIEW_FIELD, self.overview.clone())
            .add_text(TAGLINE_FIELD, self.tagline.clone())
            .add_field(RUNTIME_FIELD, FieldValue::Integer(self.runtime))
            .add_field(REVENUE_FIELD, FieldValue::Long(self.revenue))
            .add_field(
                VOTE_AVERAGE_FIELD,
                FieldValue::Double(finite_or_zero(self.vote_average)),
            )
            .add_keyword(RELEASE_DATE_FIELD, format_date(self.release_date))
            .add_text(COMBINED_TEXT_FIELD, self.combined_text())
            .build()
    }
}

impl From<RawFilmRecord> for FilmRecord {
    fn from(raw: RawFilmRecord) -> Self {
        FilmRecord::from_raw(raw)
    }
}

/// Schema used for film documents.
pub fn film_schema() -> Schema {
    Schema::builder()
        .add_field(ID_FIELD, FieldOption::STORED)
        .add_field(TITLE_FIELD, FieldOption::STORED)
        .add_field(OVERVIEW_FIELD, FieldOption::STORED)
        .add_field(TAGLINE_FIELD, FieldOption::STORED)
        .add_field(RUNTIME_FIELD, FieldOption::STORED)
        .add_field(REVENUE_FIELD, FieldOption::STORED)
        .add_field(VOTE_AVERAGE_FIELD, FieldOption::STORED)
        .add_field(RELEASE_DATE_FIELD, FieldOption::STORED)
        .add_field(COMBINED_TEXT_FIELD, FieldOption::INDEXED)
        .build()
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmHit {
    pub id: String,
    pub title: String,
    pub overview: String,
    pub tagline: String,
    pub runtime: i32,
    pub revenue: i64,
    pub vote_average: f64,
    pub release_date: Option<NaiveDate>,
    /// Non-negative relevance; higher is better.
    pub score: f32,
}

impl FilmHit {
    /// Rebuild a hit from the stored fields of a document.
    pub fn from_document(doc: &Document, score: f32) -> Self {
        let id = doc.text(ID_FIELD).to_string();
        FilmHit {
            runtime: stored_number(&id, doc.get(RUNTIME_FIELD), FieldValue::as_integer),
            revenue: stored_number(&id, doc.get(REVENUE_FIELD), FieldValue::as_long),
            vote_average: finite_or_zero(stored_number(
                &id,
                doc.get(VOTE_AVERAGE_FIELD),
                FieldValue::as_double,
            )),
            release_date: parse_date(doc.text(RELEASE_DATE_FIELD)),
            title: doc.text(TITLE_FIELD).to_string(),
            overview: doc.text(OVERVIEW_FIELD).to_string(),
            tagline: doc.text(TAGLINE_FIELD).to_string(),
            id,
            score,
        }
    }
}

/// Parse a release date in any of the accepted layouts.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_INPUT_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Stored string form of a release date; `""` when unknown.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_or_default<T: FromStr + Default>(id: &str, field: &str, value: &str) -> T {
    let trimmed = value.trim();
    match trimmed.parse() {
        Ok(v) => v,
        Err(_) => {
            if !trimmed.is_empty() {
                debug!("film {id}: unparsable {field} {value:?}, using default");
            }
            T::default()
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn stored_number<T: FromStr + Default>(
    id: &str,
    value: Option<&FieldValue>,
    typed: fn(&FieldValue) -> Option<T>,
) -> T {
    match value {
        Some(v) => typed(v).unwrap_or_else(|| parse_or_default(id, "stored", &v.ordinal_form())),
        None => T::default(),
    }
}
