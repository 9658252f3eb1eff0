use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use serde::Serialize;

use crate::sentiment::tokenize;

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as",
        "at", "be", "because", "been", "before", "being", "but", "by", "can", "could", "did",
        "do", "does", "doing", "for", "from", "had", "has", "have", "having", "he", "her",
        "here", "hers", "him", "his", "how", "i", "i'm", "i've", "if", "in", "into", "is",
        "it", "it's", "its", "just", "me", "more", "most", "my", "of", "off", "on", "once",
        "only", "or", "other", "our", "ours", "out", "over", "same", "she", "should", "so",
        "some", "such", "than", "that", "that's", "the", "their", "them", "then", "there",
        "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
        "us", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
        "why", "will", "with", "would", "you", "your", "yours",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone)]
pub struct WordCloudConfig {
    pub width: u32,
    pub height: u32,
    pub max_words: usize,
    pub min_font_size: u32,
    pub max_font_size: u32,
    /// Gap kept between word boxes, in pixels.
    pub margin: u32,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            max_words: 200,
            min_font_size: 10,
            max_font_size: 90,
            margin: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedWord {
    pub word: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
}

impl PlacedWord {
    fn overlaps(&self, x: i32, y: i32, width: u32, height: u32, margin: u32) -> bool {
        let m = margin as i32;
        x < self.x + self.width as i32 + m
            && self.x < x + width as i32 + m
            && y < self.y + self.height as i32 + m
            && self.y < y + height as i32 + m
    }
}

/// Most frequent words first, ties in alphabetical order.
pub fn word_frequencies(text: &str, max_words: usize) -> Vec<WordFrequency> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in tokenize(text) {
        if token.chars().count() < 2 || STOPWORDS.contains(token.as_str()) {
            continue;
        }
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut frequencies: Vec<WordFrequency> = counts
        .into_iter()
        .map(|(word, count)| WordFrequency { word, count })
        .collect();
    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    frequencies.truncate(max_words);
    frequencies
}

/// Rough text extent for a sans-serif face when no font metrics are available.
pub fn estimate_extent(word: &str, font_size: u32) -> (u32, u32) {
    let width = (word.chars().count() as f64 * font_size as f64 * 0.6).ceil() as u32;
    (width.max(1), font_size.max(1))
}

/// Places words largest first along an Archimedean spiral from the canvas centre.
///
/// A word that collides at every spiral position is retried at 80% of its size.
/// Once a word cannot be placed even at the minimum size, layout stops: every
/// remaining word would be at most that size.
pub fn layout<F>(frequencies: &[WordFrequency], config: &WordCloudConfig, measure: F) -> Vec<PlacedWord>
where
    F: Fn(&str, u32) -> (u32, u32),
{
    let Some(top) = frequencies.iter().map(|f| f.count).max() else {
        return Vec::new();
    };

    let mut placed: Vec<PlacedWord> = Vec::new();
    let span = config.max_font_size.saturating_sub(config.min_font_size) as f64;

    for frequency in frequencies {
        let relative = frequency.count as f64 / top as f64;
        let mut font_size = config.min_font_size + (span * relative).round() as u32;

        loop {
            let (width, height) = measure(&frequency.word, font_size);
            if let Some((x, y)) = find_position(&placed, config, width, height) {
                placed.push(PlacedWord {
                    word: frequency.word.clone(),
                    x,
                    y,
                    width,
                    height,
                    font_size,
                });
                break;
            }
            if font_size <= config.min_font_size {
                return placed;
            }
            font_size = ((font_size as f64 * 0.8) as u32).max(config.min_font_size);
        }
    }

    placed
}

fn find_position(
    placed: &[PlacedWord],
    config: &WordCloudConfig,
    width: u32,
    height: u32,
) -> Option<(i32, i32)> {
    if width > config.width || height > config.height {
        return None;
    }

    let cx = config.width as f64 / 2.0;
    let cy = config.height as f64 / 2.0;
    let aspect = config.height as f64 / config.width as f64;
    let max_radius = cx.hypot(cy);

    let mut angle: f64 = 0.0;
    loop {
        let radius = 2.0 * angle;
        if radius > max_radius / aspect.min(1.0) {
            return None;
        }

        let x = (cx + radius * angle.cos() - width as f64 / 2.0).round() as i32;
        let y = (cy + radius * aspect * angle.sin() - height as f64 / 2.0).round() as i32;

        let inside = x >= 0
            && y >= 0
            && x + width as i32 <= config.width as i32
            && y + height as i32 <= config.height as i32;
        if inside
            && !placed
                .iter()
                .any(|other| other.overlaps(x, y, width, height, config.margin))
        {
            return Some((x, y));
        }

        angle += 0.2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text() -> String {
        [
            "Great service and great food",
            "The food was cold but the staff were friendly",
            "Friendly staff, great prices",
            "Slow delivery, cold food",
        ]
        .join(" ")
    }

    #[test]
    fn frequencies_skip_stopwords_and_sort() {
        let frequencies = word_frequencies(&sample_text(), 200);
        let top: Vec<_> = frequencies
            .iter()
            .take(4)
            .map(|f| (f.word.as_str(), f.count))
            .collect();
        assert_eq!(
            top,
            vec![("food", 3), ("great", 3), ("cold", 2), ("friendly", 2)]
        );
        assert!(frequencies.iter().all(|f| f.word != "the" && f.word != "and"));
    }

    #[test]
    fn frequencies_respect_word_limit() {
        assert_eq!(word_frequencies(&sample_text(), 3).len(), 3);
        assert!(word_frequencies("a the and", 10).is_empty());
    }

    #[test]
    fn layout_keeps_words_inside_canvas_without_overlap() {
        let config = WordCloudConfig::default();
        let frequencies = word_frequencies(&sample_text(), config.max_words);
        let placed = layout(&frequencies, &config, estimate_extent);

        assert_eq!(placed.len(), frequencies.len());
        for (i, a) in placed.iter().enumerate() {
            assert!(a.x >= 0 && a.y >= 0);
            assert!(a.x + a.width as i32 <= config.width as i32);
            assert!(a.y + a.height as i32 <= config.height as i32);
            for b in placed.iter().skip(i + 1) {
                assert!(!a.overlaps(b.x, b.y, b.width, b.height, 0), "{} overlaps {}", a.word, b.word);
            }
        }
    }

    #[test]
    fn most_frequent_word_is_largest_and_centred() {
        let config = WordCloudConfig::default();
        let frequencies = word_frequencies(&sample_text(), config.max_words);
        let placed = layout(&frequencies, &config, estimate_extent);

        let first = &placed[0];
        assert_eq!(first.word, "food");
        assert_eq!(first.font_size, config.max_font_size);
        assert!(placed.iter().all(|p| p.font_size <= first.font_size));
        let centre_x = first.x + first.width as i32 / 2;
        assert!((centre_x - config.width as i32 / 2).abs() <= 1);
    }

    #[test]
    fn layout_is_deterministic() {
        let config = WordCloudConfig::default();
        let frequencies = word_frequencies(&sample_text(), config.max_words);
        assert_eq!(
            layout(&frequencies, &config, estimate_extent),
            layout(&frequencies, &config, estimate_extent)
        );
    }

    #[test]
    fn crowded_canvas_stops_at_minimum_size() {
        let config = WordCloudConfig {
            width: 60,
            height: 30,
            ..WordCloudConfig::default()
        };
        let frequencies = vec![
            WordFrequency {
                word: "enormous".to_string(),
                count: 5,
            },
            WordFrequency {
                word: "ok".to_string(),
                count: 1,
            },
        ];
        let placed = layout(&frequencies, &config, estimate_extent);
        assert!(placed.len() <= 2);
        for word in &placed {
            assert!(word.width <= config.width && word.height <= config.height);
        }
    }
}
