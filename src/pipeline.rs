use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{PipelineError, SectionError};
use crate::models::{
    CategoryCounts, DatedRecord, EnrichedRecord, FeedbackRecord, MonthlyAverage,
    SentimentCategory,
};
use crate::sentiment::SentimentScorer;

pub const REVIEW_COLUMN: &str = "Review";
pub const RATING_COLUMN: &str = "Rating";
pub const DATE_COLUMN: &str = "Date";
pub const DATE_FORMAT: &str = "%d-%m-%Y";

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-\d{2}-\d{4}$").expect("date pattern is valid"));

/// The uploaded CSV as text cells, before any column is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn preview(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub review: usize,
    pub rating: usize,
    pub date: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Every row with its sentiment and date parse outcome.
    pub dated: Vec<DatedRecord>,
    /// Rows whose date parsed; the input to the monthly aggregation.
    pub valid: Vec<DatedRecord>,
    pub dropped_dates: usize,
    /// Non-blank Rating cells that are not finite numbers; read as missing.
    pub invalid_ratings: usize,
    pub category_counts: CategoryCounts,
    #[serde(serialize_with = "serialize_section")]
    pub monthly_average: Result<Vec<MonthlyAverage>, SectionError>,
    #[serde(serialize_with = "serialize_section")]
    pub word_cloud_text: Result<String, SectionError>,
}

/// Writes a section as `{"value": ..., "error": ...}` with one side null.
fn serialize_section<T, S>(section: &Result<T, SectionError>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    #[derive(Serialize)]
    struct Section<'a, T> {
        value: Option<&'a T>,
        error: Option<String>,
    }

    Section {
        value: section.as_ref().ok(),
        error: section.as_ref().err().map(ToString::to_string),
    }
    .serialize(serializer)
}

pub fn parse(raw: &[u8]) -> Result<RawTable, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(raw);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > headers.len() {
            return Err(PipelineError::ExtraFields {
                row: index + 1,
                expected: headers.len(),
                found: record.len(),
            });
        }
        // Short rows are padded with empty cells, read later as missing values.
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

pub fn validate(table: &RawTable) -> Result<Columns, PipelineError> {
    let position = |name: &str| table.headers.iter().position(|h| h == name);

    match (
        position(REVIEW_COLUMN),
        position(RATING_COLUMN),
        position(DATE_COLUMN),
    ) {
        (Some(review), Some(rating), Some(date)) => Ok(Columns {
            review,
            rating,
            date,
        }),
        (review, rating, date) => {
            let missing = [
                (REVIEW_COLUMN, review),
                (RATING_COLUMN, rating),
                (DATE_COLUMN, date),
            ]
            .into_iter()
            .filter(|(_, index)| index.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
            Err(PipelineError::Schema { missing })
        }
    }
}

/// A finite number, or `None` for blank, non-numeric, `NaN` and infinite cells.
pub fn parse_rating(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|rating| rating.is_finite())
}

/// Typed rows plus the number of non-blank Rating cells that were unreadable.
pub fn records(table: &RawTable, columns: &Columns) -> (Vec<FeedbackRecord>, usize) {
    let mut records = Vec::with_capacity(table.rows.len());
    let mut invalid_ratings = 0;

    for (index, row) in table.rows.iter().enumerate() {
        let cell = |column: usize| row.get(column).map(String::as_str).unwrap_or("");

        let review = match cell(columns.review) {
            "" => None,
            text => Some(text.to_string()),
        };

        let rating_text = cell(columns.rating);
        let rating = parse_rating(rating_text);
        if rating.is_none() && !rating_text.trim().is_empty() {
            debug!(row = index + 1, value = rating_text, "unreadable rating");
            invalid_ratings += 1;
        }

        records.push(FeedbackRecord {
            review,
            rating,
            date: cell(columns.date).to_string(),
        });
    }

    (records, invalid_ratings)
}

pub fn enrich(records: &[FeedbackRecord], scorer: &dyn SentimentScorer) -> Vec<EnrichedRecord> {
    records
        .iter()
        .map(|record| {
            let sentiment = record
                .review
                .as_deref()
                .map(|text| scorer.score(text))
                .unwrap_or(0.0);
            EnrichedRecord {
                record: record.clone(),
                sentiment,
                category: SentimentCategory::from_score(sentiment),
            }
        })
        .collect()
}

/// Strict `DD-MM-YYYY`; surrounding whitespace is ignored, anything else is `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if !DATE_SHAPE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub fn parse_dates(enriched: &[EnrichedRecord]) -> Vec<DatedRecord> {
    enriched
        .iter()
        .map(|record| DatedRecord {
            date: parse_date(&record.record.date),
            enriched: record.clone(),
        })
        .collect()
}

pub fn drop_invalid_dates(dated: &[DatedRecord]) -> (Vec<DatedRecord>, usize) {
    let valid: Vec<DatedRecord> = dated
        .iter()
        .filter(|record| record.date.is_some())
        .cloned()
        .collect();
    let dropped = dated.len() - valid.len();
    (valid, dropped)
}

pub fn category_counts(enriched: &[EnrichedRecord]) -> CategoryCounts {
    let mut counts = CategoryCounts::default();
    for record in enriched {
        counts.add(record.category);
    }
    counts
}

pub fn monthly_average_rating(dated: &[DatedRecord]) -> Result<Vec<MonthlyAverage>, SectionError> {
    let mut months: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

    for record in dated {
        let (Some(date), Some(rating)) = (record.date, record.enriched.record.rating) else {
            continue;
        };
        let Some(month) = date.with_day(1) else {
            continue;
        };
        let entry = months.entry(month).or_insert((0.0, 0));
        entry.0 += rating;
        entry.1 += 1;
    }

    if months.is_empty() {
        return Err(SectionError::NoData);
    }

    Ok(months
        .into_iter()
        .map(|(month, (total, count))| MonthlyAverage {
            month,
            average_rating: total / count as f64,
            rating_count: count,
        })
        .collect())
}

pub fn word_cloud_text(enriched: &[EnrichedRecord]) -> Result<String, SectionError> {
    let reviews: Vec<&str> = enriched
        .iter()
        .filter_map(|record| record.record.review.as_deref())
        .filter(|text| !text.trim().is_empty())
        .collect();

    if reviews.is_empty() {
        return Err(SectionError::NoText);
    }

    Ok(reviews.join(" "))
}

pub fn analyze(table: &RawTable, scorer: &dyn SentimentScorer) -> Result<Analysis, PipelineError> {
    let columns = validate(table)?;
    let (records, invalid_ratings) = records(table, &columns);
    debug!(rows = records.len(), "parsed feedback records");
    if invalid_ratings > 0 {
        warn!(invalid = invalid_ratings, "read unreadable ratings as missing");
    }

    let enriched = enrich(&records, scorer);
    let category_counts = category_counts(&enriched);
    let word_cloud_text = word_cloud_text(&enriched);

    let dated = parse_dates(&enriched);
    let (valid, dropped_dates) = drop_invalid_dates(&dated);
    if dropped_dates > 0 {
        warn!(dropped = dropped_dates, "dropped rows with unparseable dates");
    }
    let monthly_average = monthly_average_rating(&valid);

    Ok(Analysis {
        dated,
        valid,
        dropped_dates,
        invalid_ratings,
        category_counts,
        monthly_average,
        word_cloud_text,
    })
}

pub fn process(raw: &[u8], scorer: &dyn SentimentScorer) -> Result<Analysis, PipelineError> {
    let table = parse(raw)?;
    analyze(&table, scorer)
}
