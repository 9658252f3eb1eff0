use std::path::Path;

use plotters::prelude::*;
use tracing::{debug, info, warn};

use crate::models::{CategoryCounts, MonthlyAverage};
use crate::pipeline::Analysis;
use crate::wordcloud::{estimate_extent, layout, word_frequencies, WordCloudConfig};

pub const DISTRIBUTION_FILE: &str = "sentiment_distribution.png";
pub const AVERAGE_RATING_FILE: &str = "average_rating.png";
pub const WORD_CLOUD_FILE: &str = "wordcloud.png";

const CHART_SIZE: (u32, u32) = (800, 400);

const PALETTE: [RGBColor; 6] = [
    RGBColor(68, 1, 84),
    RGBColor(59, 82, 139),
    RGBColor(33, 145, 140),
    RGBColor(94, 201, 98),
    RGBColor(49, 104, 142),
    RGBColor(253, 231, 37),
];

/// File names written next to the report, relative to the output directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artifacts {
    pub distribution: Option<String>,
    pub average_rating: Option<String>,
    pub word_cloud: Option<String>,
}

/// Renders every chart the analysis has data for. A chart that fails to render is
/// logged and left out; the other charts are still written.
pub fn render_all(analysis: &Analysis, out_dir: &Path) -> Artifacts {
    let mut artifacts = Artifacts::default();

    let path = out_dir.join(DISTRIBUTION_FILE);
    match render_sentiment_distribution(&analysis.category_counts, &path) {
        Ok(()) => artifacts.distribution = Some(DISTRIBUTION_FILE.to_string()),
        Err(err) => warn!(error = %err, "failed to render sentiment distribution"),
    }

    if let Ok(monthly) = &analysis.monthly_average {
        let path = out_dir.join(AVERAGE_RATING_FILE);
        match render_average_rating(monthly, &path) {
            Ok(()) => artifacts.average_rating = Some(AVERAGE_RATING_FILE.to_string()),
            Err(err) => warn!(error = %err, "failed to render average rating chart"),
        }
    }

    if let Ok(text) = &analysis.word_cloud_text {
        let path = out_dir.join(WORD_CLOUD_FILE);
        match render_word_cloud(text, &WordCloudConfig::default(), &path) {
            Ok(placed) => {
                debug!(words = placed, "placed word cloud words");
                artifacts.word_cloud = Some(WORD_CLOUD_FILE.to_string());
            }
            Err(err) => warn!(error = %err, "failed to render word cloud"),
        }
    }

    artifacts
}

pub fn render_sentiment_distribution(counts: &CategoryCounts, path: &Path) -> anyhow::Result<()> {
    let categories: Vec<_> = counts.iter().collect();
    let top = categories.iter().map(|(_, count)| *count as u32).max().unwrap_or(0).max(1);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Sentiment Distribution", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            (0u32..categories.len() as u32).into_segmented(),
            0u32..top + top / 10 + 1,
        )?;

    let label = |value: &SegmentValue<u32>| match value {
        SegmentValue::CenterOf(i) => categories
            .get(*i as usize)
            .map(|(category, _)| category.as_str().to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Sentiment Category")
        .y_desc("Reviews")
        .x_label_formatter(&label)
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(PALETTE[1].filled())
            .margin(40)
            .data(
                categories
                    .iter()
                    .enumerate()
                    .map(|(i, (_, count))| (i as u32, *count as u32)),
            ),
    )?;

    root.present()?;
    info!(path = %path.display(), "wrote sentiment distribution chart");
    Ok(())
}

pub fn render_average_rating(monthly: &[MonthlyAverage], path: &Path) -> anyhow::Result<()> {
    let last = (monthly.len() as i32 - 1).max(1);
    let top = monthly
        .iter()
        .map(|m| m.average_rating)
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Average Rating Over Time", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0i32..last, 0f64..top * 1.1)?;

    let label = |i: &i32| {
        usize::try_from(*i)
            .ok()
            .and_then(|i| monthly.get(i))
            .map(|m| m.month.format("%Y-%m").to_string())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .x_labels(monthly.len().max(2))
        .x_desc("Month")
        .y_desc("Rating")
        .x_label_formatter(&label)
        .draw()?;

    let points: Vec<(i32, f64)> = monthly
        .iter()
        .enumerate()
        .map(|(i, m)| (i as i32, m.average_rating))
        .collect();

    chart.draw_series(LineSeries::new(points.clone(), &PALETTE[1]))?;
    chart.draw_series(
        points
            .into_iter()
            .map(|point| Circle::new(point, 4, PALETTE[2].filled())),
    )?;

    root.present()?;
    info!(path = %path.display(), months = monthly.len(), "wrote average rating chart");
    Ok(())
}

/// Returns how many words made it onto the canvas.
pub fn render_word_cloud(text: &str, config: &WordCloudConfig, path: &Path) -> anyhow::Result<usize> {
    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let frequencies = word_frequencies(text, config.max_words);
    let placed = layout(&frequencies, config, |word, size| {
        let style = TextStyle::from(("sans-serif", size as f64));
        root.estimate_text_size(word, &style)
            .unwrap_or_else(|_| estimate_extent(word, size))
    });

    for (rank, word) in placed.iter().enumerate() {
        let style = ("sans-serif", word.font_size as f64)
            .into_font()
            .color(&PALETTE[rank % PALETTE.len()]);
        root.draw(&Text::new(word.word.clone(), (word.x, word.y), style))?;
    }

    root.present()?;
    info!(path = %path.display(), "wrote word cloud");
    Ok(placed.len())
}
