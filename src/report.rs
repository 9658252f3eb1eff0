use std::fmt::Write;

use crate::charts::Artifacts;
use crate::error::PipelineError;
use crate::models::DatedRecord;
use crate::pipeline::{Analysis, RawTable};

fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn write_table(output: &mut String, headers: &[&str], rows: impl IntoIterator<Item = Vec<String>>) {
    let _ = writeln!(output, "| {} |", headers.join(" | "));
    let _ = writeln!(output, "|{}", " --- |".repeat(headers.len()));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|value| cell(value)).collect();
        let _ = writeln!(output, "| {} |", cells.join(" | "));
    }
}

fn record_rows(records: &[DatedRecord]) -> impl Iterator<Item = Vec<String>> + '_ {
    records.iter().map(|dated| {
        let record = &dated.enriched.record;
        vec![
            record.review.clone().unwrap_or_default(),
            record.rating.map(|r| r.to_string()).unwrap_or_default(),
            record.date.clone(),
            dated
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "invalid".to_string()),
            format!("{:.3}", dated.enriched.sentiment),
            dated.enriched.category.as_str().to_string(),
        ]
    })
}

const RECORD_HEADERS: [&str; 6] = [
    "Review",
    "Rating",
    "Date",
    "Parsed Date",
    "Sentiment",
    "Sentiment Category",
];

pub fn build_report(
    table: &RawTable,
    preview_rows: usize,
    outcome: &Result<Analysis, PipelineError>,
    artifacts: &Artifacts,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Customer Feedback Analysis");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Data Preview");

    if table.rows.is_empty() {
        let _ = writeln!(output, "The uploaded file has no data rows.");
    } else {
        let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
        write_table(&mut output, &headers, table.preview(preview_rows).iter().cloned());
    }

    let analysis = match outcome {
        Ok(analysis) => analysis,
        Err(err) => {
            let _ = writeln!(output);
            let _ = writeln!(output, "**Error:** {err}");
            return output;
        }
    };

    let _ = writeln!(output);
    let _ = writeln!(output, "## Sentiment Distribution");
    for (category, count) in analysis.category_counts.iter() {
        let _ = writeln!(output, "- {}: {}", category.as_str(), count);
    }
    if let Some(file) = &artifacts.distribution {
        let _ = writeln!(output);
        let _ = writeln!(output, "![Sentiment Distribution]({file})");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Data after Date Conversion");
    write_table(&mut output, &RECORD_HEADERS, record_rows(&analysis.dated));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Data after Dropping Invalid Dates");
    if analysis.dropped_dates > 0 {
        let _ = writeln!(
            output,
            "Dropped {} of {} rows with dates not in DD-MM-YYYY format.",
            analysis.dropped_dates,
            analysis.dated.len()
        );
        let _ = writeln!(output);
    }
    if analysis.valid.is_empty() {
        let _ = writeln!(output, "No rows have a valid date.");
    } else {
        write_table(&mut output, &RECORD_HEADERS, record_rows(&analysis.valid));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Average Rating Over Time");
    if analysis.invalid_ratings > 0 {
        let _ = writeln!(
            output,
            "Read {} Rating values that are not numbers as missing.",
            analysis.invalid_ratings
        );
        let _ = writeln!(output);
    }
    match &analysis.monthly_average {
        Ok(monthly) => {
            write_table(
                &mut output,
                &["Month", "Average Rating", "Ratings"],
                monthly.iter().map(|m| {
                    vec![
                        m.month.format("%Y-%m").to_string(),
                        format!("{:.2}", m.average_rating),
                        m.rating_count.to_string(),
                    ]
                }),
            );
            if let Some(file) = &artifacts.average_rating {
                let _ = writeln!(output);
                let _ = writeln!(output, "![Average Rating Over Time]({file})");
            }
        }
        Err(err) => {
            let _ = writeln!(output, "**Error:** {err}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Word Cloud of Reviews");
    match (&analysis.word_cloud_text, &artifacts.word_cloud) {
        (Err(err), _) => {
            let _ = writeln!(output, "**Error:** {err}");
        }
        (Ok(_), Some(file)) => {
            let _ = writeln!(output, "![Word Cloud of Reviews]({file})");
        }
        (Ok(_), None) => {
            let _ = writeln!(output, "Word cloud was not rendered.");
        }
    }

    output
}

/// Plain-text digest for the terminal.
pub fn build_summary(analysis: &Analysis) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Sentiment distribution:");
    for (category, count) in analysis.category_counts.iter() {
        let _ = writeln!(output, "- {}: {}", category.as_str(), count);
    }

    if analysis.dropped_dates > 0 {
        let _ = writeln!(
            output,
            "Dropped {} rows with dates not in DD-MM-YYYY format.",
            analysis.dropped_dates
        );
    }

    if analysis.invalid_ratings > 0 {
        let _ = writeln!(
            output,
            "Read {} Rating values that are not numbers as missing.",
            analysis.invalid_ratings
        );
    }

    let _ = writeln!(output, "Average rating by month:");
    match &analysis.monthly_average {
        Ok(monthly) => {
            for m in monthly {
                let _ = writeln!(
                    output,
                    "- {}: {:.2} ({} ratings)",
                    m.month.format("%Y-%m"),
                    m.average_rating,
                    m.rating_count
                );
            }
        }
        Err(err) => {
            let _ = writeln!(output, "{err}");
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{analyze, parse};
    use crate::sentiment::LexiconScorer;

    fn report_for(csv: &str, artifacts: &Artifacts) -> String {
        let table = parse(csv.as_bytes()).unwrap();
        let outcome = analyze(&table, &LexiconScorer::new());
        build_report(&table, 5, &outcome, artifacts)
    }

    #[test]
    fn schema_error_keeps_preview_and_stops() {
        let report = report_for("Review,Date\ngreat,01-01-2024\n", &Artifacts::default());

        assert!(report.contains("## Data Preview"));
        assert!(report.contains("| great | 01-01-2024 |"));
        assert!(report.contains("**Error:** CSV must contain 'Review', 'Rating', and 'Date' columns"));
        assert!(!report.contains("## Sentiment Distribution"));
        assert!(!report.contains("## Word Cloud of Reviews"));
    }

    #[test]
    fn sections_follow_dashboard_order() {
        let csv = "Review,Rating,Date\ngreat service,5,01-01-2024\nterrible wait,1,15-01-2024\nit was ok,3,bad-date\n";
        let artifacts = Artifacts {
            distribution: Some("sentiment_distribution.png".to_string()),
            average_rating: Some("average_rating.png".to_string()),
            word_cloud: Some("wordcloud.png".to_string()),
        };
        let report = report_for(csv, &artifacts);

        let order = [
            "## Data Preview",
            "## Sentiment Distribution",
            "## Data after Date Conversion",
            "## Data after Dropping Invalid Dates",
            "## Average Rating Over Time",
            "## Word Cloud of Reviews",
        ];
        let positions: Vec<usize> = order.iter().map(|h| report.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(report.contains("- Positive: 1"));
        assert!(report.contains("- Negative: 1"));
        assert!(report.contains("- Neutral: 1"));
        assert!(report.contains("Dropped 1 of 3 rows"));
        assert!(report.contains("| it was ok | 3 | bad-date | invalid |"));
        assert!(report.contains("| 2024-01 | 3.00 | 2 |"));
        assert!(report.contains("![Word Cloud of Reviews](wordcloud.png)"));
    }

    #[test]
    fn section_errors_are_reported_inline() {
        let csv = "Review,Rating,Date\n,4,not-a-date\n";
        let report = report_for(csv, &Artifacts::default());

        assert!(report.contains("No rows have a valid date."));
        assert!(report.contains("**Error:** No data available for average rating calculation."));
        assert!(report.contains("**Error:** No valid reviews available for word cloud generation."));
        assert!(report.contains("- Neutral: 1"));
    }

    #[test]
    fn pipes_in_reviews_do_not_break_tables() {
        let csv = "Review,Rating,Date\n\"good | fast\",5,01-01-2024\n";
        let report = report_for(csv, &Artifacts::default());
        assert!(report.contains("good \\| fast"));
    }

    #[test]
    fn summary_lists_months_and_dropped_rows() {
        let csv = "Review,Rating,Date\ngood,4,01-02-2024\nbad,2,28-02-2024\nok,5,??\n";
        let analysis = analyze(&parse(csv.as_bytes()).unwrap(), &LexiconScorer::new()).unwrap();
        let summary = build_summary(&analysis);

        assert!(summary.contains("- Positive: 1"));
        assert!(summary.contains("Dropped 1 rows"));
        assert!(summary.contains("- 2024-02: 3.00 (2 ratings)"));
        assert!(!summary.contains("not numbers"));
    }

    #[test]
    fn unreadable_ratings_are_counted_in_report() {
        let csv = "Review,Rating,Date\ngreat,5,01-01-2024\nawful,N/A,02-01-2024\n";
        let report = report_for(csv, &Artifacts::default());

        assert!(report.contains("Read 1 Rating values that are not numbers as missing."));
        assert!(report.contains("- Negative: 1"));
        assert!(report.contains("| 2024-01 | 5.00 | 1 |"));
    }
}
