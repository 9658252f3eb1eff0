use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]+(?:'[a-z]+)*").expect("word pattern is valid"));
static CLAUSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?;]+").expect("clause pattern is valid"));

/// Maps free text to a polarity in [-1.0, 1.0].
pub trait SentimentScorer {
    fn score(&self, text: &str) -> f64;
}

/// Lower-case word tokens, apostrophes kept inside words ("don't").
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_REGEX
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Rule-based polarity lexicon for product and service reviews.
///
/// Each sentiment word found contributes its polarity, scaled by any intensifiers
/// directly before it and flipped and damped by a negation at most
/// `NEGATION_WINDOW` words earlier in the same sentence. The text score is the mean
/// of the contributions. Text without sentiment words scores 0.0.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    words: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    negations: Vec<String>,
}

const NEGATION_FACTOR: f64 = -0.5;
/// Plain words allowed between a negation and the sentiment word it flips.
const NEGATION_WINDOW: usize = 3;

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        let positive = [
            ("excellent", 1.0),
            ("outstanding", 1.0),
            ("perfect", 1.0),
            ("best", 1.0),
            ("amazing", 0.6),
            ("awesome", 1.0),
            ("fantastic", 0.4),
            ("wonderful", 1.0),
            ("superb", 1.0),
            ("great", 0.8),
            ("love", 0.5),
            ("loved", 0.7),
            ("delighted", 0.7),
            ("happy", 0.8),
            ("pleased", 0.5),
            ("satisfied", 0.5),
            ("impressive", 1.0),
            ("impressed", 0.7),
            ("good", 0.7),
            ("nice", 0.6),
            ("friendly", 0.4),
            ("helpful", 0.5),
            ("fast", 0.2),
            ("quick", 0.3),
            ("easy", 0.4),
            ("clean", 0.4),
            ("fresh", 0.3),
            ("recommend", 0.4),
            ("recommended", 0.4),
            ("reliable", 0.5),
            ("smooth", 0.4),
            ("polite", 0.4),
            ("professional", 0.3),
            ("affordable", 0.3),
            ("comfortable", 0.4),
            ("enjoyed", 0.5),
            ("pleasant", 0.7),
            ("fine", 0.4),
            ("better", 0.5),
            ("beautiful", 0.85),
            ("thanks", 0.2),
            ("worth", 0.3),
        ];

        let negative = [
            ("terrible", -1.0),
            ("horrible", -1.0),
            ("awful", -1.0),
            ("worst", -1.0),
            ("disgusting", -1.0),
            ("bad", -0.7),
            ("poor", -0.4),
            ("rude", -0.3),
            ("slow", -0.3),
            ("late", -0.3),
            ("dirty", -0.6),
            ("broken", -0.4),
            ("disappointed", -0.75),
            ("disappointing", -0.6),
            ("annoying", -0.8),
            ("frustrating", -0.4),
            ("hate", -0.8),
            ("hated", -0.9),
            ("unhappy", -0.6),
            ("useless", -0.5),
            ("expensive", -0.5),
            ("overpriced", -0.5),
            ("cold", -0.6),
            ("wrong", -0.5),
            ("unacceptable", -0.8),
            ("unprofessional", -0.6),
            ("confusing", -0.3),
            ("difficult", -0.5),
            ("never", -0.1),
            ("worse", -0.4),
            ("sad", -0.5),
            ("angry", -0.5),
            ("problem", -0.3),
            ("refund", -0.2),
            ("waste", -0.6),
            ("mediocre", -0.3),
        ];

        let mut words = HashMap::new();
        for (word, score) in positive.into_iter().chain(negative) {
            words.insert(word.to_string(), score);
        }

        let mut intensifiers = HashMap::new();
        for (word, multiplier) in [
            ("very", 1.3),
            ("really", 1.3),
            ("extremely", 1.5),
            ("super", 1.3),
            ("incredibly", 1.5),
            ("absolutely", 1.4),
            ("so", 1.2),
            ("too", 1.2),
            ("quite", 1.1),
            ("pretty", 1.1),
            ("somewhat", 0.7),
            ("slightly", 0.5),
            ("barely", 0.5),
        ] {
            intensifiers.insert(word.to_string(), multiplier);
        }

        let negations = [
            "not", "no", "isn't", "wasn't", "aren't", "weren't", "don't", "doesn't",
            "didn't", "can't", "cannot", "couldn't", "won't", "wouldn't", "hardly",
            "nothing", "nor",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            words,
            intensifiers,
            negations,
        }
    }

    fn is_negation(&self, word: &str) -> bool {
        self.negations.iter().any(|n| n == word)
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let mut contributions = Vec::new();

        for clause in CLAUSE_REGEX.split(text) {
            let mut multiplier = 1.0;
            // Plain words seen since the last negation.
            let mut since_negation: Option<usize> = None;

            for token in tokenize(clause) {
                if self.is_negation(&token) {
                    since_negation = Some(0);
                    continue;
                }
                if let Some(factor) = self.intensifiers.get(&token) {
                    multiplier *= factor;
                    continue;
                }
                if let Some(polarity) = self.words.get(&token) {
                    let mut value = (polarity * multiplier).clamp(-1.0, 1.0);
                    if since_negation.is_some() {
                        value *= NEGATION_FACTOR;
                    }
                    contributions.push(value);
                    multiplier = 1.0;
                    since_negation = None;
                    continue;
                }

                multiplier = 1.0;
                since_negation = since_negation
                    .map(|seen| seen + 1)
                    .filter(|seen| *seen <= NEGATION_WINDOW);
            }
        }

        if contributions.is_empty() {
            return 0.0;
        }

        let mean = contributions.iter().sum::<f64>() / contributions.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_keeps_contractions() {
        assert_eq!(
            tokenize("Didn't LOVE it, 10/10!"),
            vec!["didn't", "love", "it"]
        );
    }

    #[test]
    fn scenario_reviews_fall_into_each_category() {
        let scorer = LexiconScorer::new();
        assert!(scorer.score("great service") > 0.0);
        assert!(scorer.score("terrible wait") < 0.0);
        assert_eq!(scorer.score("it was ok"), 0.0);
    }

    #[test]
    fn blank_text_is_neutral() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.score(""), 0.0);
        assert_eq!(scorer.score("   \t\n"), 0.0);
    }

    #[test]
    fn negation_flips_and_damps() {
        let scorer = LexiconScorer::new();
        let plain = scorer.score("good");
        let negated = scorer.score("not good");
        assert!(negated < 0.0);
        assert!((negated - plain * NEGATION_FACTOR).abs() < 1e-9);
        assert!(scorer.score("not bad") > 0.0);
        assert!(scorer.score("not at all good") < 0.0);
    }

    #[test]
    fn negation_stops_at_sentence_end() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.score("I did not go there. The food was great."), 0.8);
        assert_eq!(scorer.score("No parking; friendly staff"), 0.4);
    }

    #[test]
    fn negation_expires_after_a_few_words() {
        let scorer = LexiconScorer::new();
        assert!(scorer.score("not something I would ever call good") > 0.0);
    }

    #[test]
    fn intensifier_scales_next_word_within_bounds() {
        let scorer = LexiconScorer::new();
        assert!(scorer.score("very good") > scorer.score("good"));
        assert!(scorer.score("slightly good") < scorer.score("good"));
        assert_eq!(scorer.score("extremely excellent"), 1.0);
        assert_eq!(scorer.score("absolutely terrible"), -1.0);
    }

    #[test]
    fn score_is_mean_of_sentiment_words() {
        let scorer = LexiconScorer::new();
        let expected = (0.8 + -1.0) / 2.0;
        assert!((scorer.score("great food, terrible parking") - expected).abs() < 1e-9);
    }

    #[test]
    fn scores_are_deterministic() {
        let scorer = LexiconScorer::new();
        let text = "Really friendly staff but the room was dirty and not clean";
        let first = scorer.score(text);
        for _ in 0..10 {
            assert_eq!(scorer.score(text), first);
        }
    }
}
