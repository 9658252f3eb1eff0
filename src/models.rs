use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRecord {
    pub review: Option<String>,
    pub rating: Option<f64>,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SentimentCategory {
    Positive,
    Negative,
    Neutral,
}

impl SentimentCategory {
    /// Sign rule: strictly positive, strictly negative, otherwise neutral.
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            SentimentCategory::Positive
        } else if score < 0.0 {
            SentimentCategory::Negative
        } else {
            SentimentCategory::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentCategory::Positive => "Positive",
            SentimentCategory::Negative => "Negative",
            SentimentCategory::Neutral => "Neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub record: FeedbackRecord,
    pub sentiment: f64,
    pub category: SentimentCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedRecord {
    pub enriched: EnrichedRecord,
    /// `None` when the raw value is not a `DD-MM-YYYY` calendar date.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub month: NaiveDate,
    pub average_rating: f64,
    pub rating_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl CategoryCounts {
    pub fn add(&mut self, category: SentimentCategory) {
        match category {
            SentimentCategory::Positive => self.positive += 1,
            SentimentCategory::Negative => self.negative += 1,
            SentimentCategory::Neutral => self.neutral += 1,
        }
    }

    pub fn get(&self, category: SentimentCategory) -> usize {
        match category {
            SentimentCategory::Positive => self.positive,
            SentimentCategory::Negative => self.negative,
            SentimentCategory::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Categories in display order, zero counts included.
    pub fn iter(&self) -> impl Iterator<Item = (SentimentCategory, usize)> + '_ {
        [
            SentimentCategory::Positive,
            SentimentCategory::Negative,
            SentimentCategory::Neutral,
        ]
        .into_iter()
        .map(move |category| (category, self.get(category)))
    }
}
