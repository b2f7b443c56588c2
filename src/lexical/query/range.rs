//! Range filters over stored field values.

use chrono::NaiveDate;

use crate::data::FieldValue;
use crate::error::Result;
use crate::lexical::query::Query;
use crate::lexical::query::matcher::Matcher;
use crate::lexical::segment::Segment;
use crate::lexical::snapshot::IndexSnapshot;

/// Inclusive bounds, one variant per comparison rule.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeBounds {
    /// Compares `Integer` and `Long` values numerically.
    Integer { lower: i32, upper: i32 },
    Long { lower: i64, upper: i64 },
    /// Compares `Double` values; NaN never matches.
    Double { lower: f64, upper: f64 },
    /// Byte-wise comparison of the value's string form. A missing value
    /// compares as the empty string. `None` leaves a side open.
    Ordinal {
        lower: Option<String>,
        upper: Option<String>,
    },
    /// Calendar comparison of a `YYYY-MM-DD` value. Missing or unparsable
    /// dates never match. `None` leaves a side open.
    Date {
        lower: Option<NaiveDate>,
        upper: Option<NaiveDate>,
    },
}

impl RangeBounds {
    pub fn contains(&self, value: Option<&FieldValue>) -> bool {
        match self {
            RangeBounds::Integer { lower, upper } => value
                .and_then(FieldValue::as_long)
                .is_some_and(|v| i64::from(*lower) <= v && v <= i64::from(*upper)),
            RangeBounds::Long { lower, upper } => value
                .and_then(FieldValue::as_long)
                .is_some_and(|v| *lower <= v && v <= *upper),
            RangeBounds::Double { lower, upper } => value
                .and_then(FieldValue::as_double)
                .is_some_and(|v| *lower <= v && v <= *upper),
            RangeBounds::Ordinal { lower, upper } => {
                let form = value.map(FieldValue::ordinal_form).unwrap_or_default();
                let form = form.as_bytes();
                lower.as_ref().is_none_or(|l| l.as_bytes() <= form)
                    && upper.as_ref().is_none_or(|u| form <= u.as_bytes())
            }
            RangeBounds::Date { lower, upper } => value
                .and_then(FieldValue::as_text)
                .and_then(|s| s.parse::<NaiveDate>().ok())
                .is_some_and(|d| lower.is_none_or(|l| l <= d) && upper.is_none_or(|u| d <= u)),
        }
    }
}

/// Matches documents whose stored `field` falls within `bounds`.
///
/// Range queries filter; every match scores zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    field: String,
    bounds: RangeBounds,
}

impl RangeQuery {
    pub fn new<S: Into<String>>(field: S, bounds: RangeBounds) -> Self {
        RangeQuery {
            field: field.into(),
            bounds,
        }
    }

    /// Integer range; an absent bound extends to the end of the `i32` range.
    pub fn int_range<S: Into<String>>(field: S, lower: Option<i32>, upper: Option<i32>) -> Self {
        Self::new(
            field,
            RangeBounds::Integer {
                lower: lower.unwrap_or(i32::MIN),
                upper: upper.unwrap_or(i32::MAX),
            },
        )
    }

    pub fn double_range<S: Into<String>>(field: S, lower: f64, upper: f64) -> Self {
        Self::new(field, RangeBounds::Double { lower, upper })
    }

    pub fn ordinal_range<S: Into<String>>(
        field: S,
        lower: Option<String>,
        upper: Option<String>,
    ) -> Self {
        Self::new(field, RangeBounds::Ordinal { lower, upper })
    }

    pub fn date_range<S: Into<String>>(
        field: S,
        lower: Option<NaiveDate>,
        upper: Option<NaiveDate>,
    ) -> Self {
        Self::new(field, RangeBounds::Date { lower, upper })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn bounds(&self) -> &RangeBounds {
        &self.bounds
    }
}

impl Query for RangeQuery {
    fn matcher<'a>(
        &'a self,
        _snapshot: &'a IndexSnapshot,
        segment: &'a Segment,
    ) -> Result<Box<dyn Matcher + 'a>> {
        Ok(Box::new(RangeMatcher::new(self, segment)))
    }

    fn description(&self) -> String {
        let (lower, upper) = match &self.bounds {
            RangeBounds::Integer { lower, upper } => (lower.to_string(), upper.to_string()),
            RangeBounds::Long { lower, upper } => (lower.to_string(), upper.to_string()),
            RangeBounds::Double { lower, upper } => (lower.to_string(), upper.to_string()),
            RangeBounds::Ordinal { lower, upper } => (
                lower.clone().unwrap_or_else(|| "*".into()),
                upper.clone().unwrap_or_else(|| "*".into()),
            ),
            RangeBounds::Date { lower, upper } => (
                lower.map_or_else(|| "*".into(), |d| d.to_string()),
                upper.map_or_else(|| "*".into(), |d| d.to_string()),
            ),
        };
        format!("{}:[{lower} TO {upper}]", self.field)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

/// Checks stored values document by document.
struct RangeMatcher<'a> {
    query: &'a RangeQuery,
    segment: &'a Segment,
    current: Option<u32>,
}

impl<'a> RangeMatcher<'a> {
    fn new(query: &'a RangeQuery, segment: &'a Segment) -> Self {
        let mut matcher = RangeMatcher {
            query,
            segment,
            current: None,
        };
        matcher.current = matcher.scan(0);
        matcher
    }

    fn scan(&self, from: u32) -> Option<u32> {
        (from..self.segment.doc_count()).find(|&doc| {
            let value = self
                .segment
                .document(doc)
                .and_then(|d| d.get(&self.query.field));
            self.query.bounds.contains(value)
        })
    }
}

impl Matcher for RangeMatcher<'_> {
    fn doc_id(&self) -> Option<u32> {
        self.current
    }

    fn next(&mut self) -> Option<u32> {
        let doc = self.current?;
        self.current = self.scan(doc + 1);
        self.current
    }

    fn advance(&mut self, target: u32) -> Option<u32> {
        let doc = self.current?;
        if doc < target {
            self.current = self.scan(target);
        }
        self.current
    }

    fn score(&self) -> f32 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_integer_bounds_are_inclusive() {
        let bounds = RangeQuery::int_range("runtime", Some(160), Some(200)).bounds;
        assert!(bounds.contains(Some(&FieldValue::Integer(160))));
        assert!(bounds.contains(Some(&FieldValue::Integer(200))));
        assert!(!bounds.contains(Some(&FieldValue::Integer(155))));
        assert!(!bounds.contains(None));
        assert!(!bounds.contains(Some(&FieldValue::Text("166".into()))));

        let open = RangeQuery::int_range("runtime", None, None).bounds;
        assert!(open.contains(Some(&FieldValue::Integer(i32::MIN))));
        assert!(open.contains(Some(&FieldValue::Integer(0))));
    }

    #[test]
    fn test_inverted_bounds_match_nothing() {
        let bounds = RangeQuery::int_range("runtime", Some(10), Some(5)).bounds;
        assert!(!bounds.contains(Some(&FieldValue::Integer(7))));
    }

    #[test]
    fn test_double_bounds() {
        let bounds = RangeQuery::double_range("vote_average", 8.0, 10.0).bounds;
        assert!(bounds.contains(Some(&FieldValue::Double(8.0))));
        assert!(!bounds.contains(Some(&FieldValue::Double(7.9))));
        assert!(!bounds.contains(Some(&FieldValue::Double(f64::NAN))));
    }

    #[test]
    fn test_ordinal_bounds_compare_strings() {
        let bounds =
            RangeQuery::ordinal_range("release_date", Some("2000".into()), Some("2024".into()))
                .bounds;
        assert!(bounds.contains(Some(&FieldValue::Keyword("2021-09-15".into()))));
        // Lexicographically past the bare year string.
        assert!(!bounds.contains(Some(&FieldValue::Keyword("2024-02-27".into()))));
        assert!(!bounds.contains(Some(&FieldValue::Keyword("".into()))));
        assert!(!bounds.contains(None));

        let open = RangeQuery::ordinal_range("release_date", None, None).bounds;
        assert!(open.contains(None));
    }

    #[test]
    fn test_date_bounds_compare_calendar_dates() {
        let bounds = RangeQuery::date_range(
            "release_date",
            Some(date(2000, 1, 1)),
            Some(date(2024, 12, 31)),
        )
        .bounds;
        assert!(bounds.contains(Some(&FieldValue::Keyword("2024-02-27".into()))));
        assert!(!bounds.contains(Some(&FieldValue::Keyword("1999-12-31".into()))));
        assert!(!bounds.contains(Some(&FieldValue::Keyword("".into()))));

        let open_lower = RangeQuery::date_range("release_date", None, Some(date(2000, 1, 1))).bounds;
        assert!(open_lower.contains(Some(&FieldValue::Keyword("1950-06-01".into()))));
    }

    #[test]
    fn test_description() {
        let q = RangeQuery::int_range("runtime", Some(1), None);
        assert_eq!(q.description(), format!("runtime:[1 TO {}]", i32::MAX));
    }
}
