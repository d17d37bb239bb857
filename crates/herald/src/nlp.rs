// ABOUTME: Lightweight text analysis: sentence segmentation, stopwords, keywords, and extractive summaries.
// ABOUTME: Sentence boundaries follow Unicode UAX #29 via unicode-segmentation.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use unicode_segmentation::UnicodeSegmentation;

/// Number of keywords kept per article.
pub const KEYWORD_COUNT: usize = 10;
/// Number of sentences in a generated summary.
pub const SUMMARY_SENTENCES: usize = 5;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
        "during", "each", "even", "few", "for", "from", "further", "get", "got", "had", "has",
        "have", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his",
        "how", "however", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "last",
        "like", "made", "make", "many", "may", "me", "might", "more", "most", "much", "must",
        "my", "myself", "new", "no", "nor", "not", "now", "of", "off", "on", "once", "one",
        "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "said",
        "same", "say", "says", "she", "should", "since", "so", "some", "still", "such", "than",
        "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these",
        "they", "this", "those", "through", "to", "too", "two", "under", "until", "up", "us",
        "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
        "why", "will", "with", "would", "year", "years", "yet", "you", "your", "yours",
        "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// True for common English function words.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word.to_lowercase().as_str())
}

/// Number of stopwords in `text`.
pub fn stopword_count(text: &str) -> usize {
    text.unicode_words().filter(|w| is_stopword(w)).count()
}

/// Sentences of `text`, trimmed, blanks dropped.
pub fn sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercased content words: not stopwords, at least two letters, not pure numbers.
fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.unicode_words()
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() > 1)
        .filter(|w| w.chars().any(char::is_alphabetic))
        .filter(|w| !STOPWORDS.contains(w.as_str()))
}

/// Term frequencies, with first-seen position for stable tie breaks.
fn frequencies(text: &str) -> HashMap<String, (usize, usize)> {
    let mut freq: HashMap<String, (usize, usize)> = HashMap::new();
    for (pos, term) in terms(text).enumerate() {
        freq.entry(term).or_insert((0, pos)).0 += 1;
    }
    freq
}

/// The `n` most frequent content words, most frequent first; ties keep text order.
pub fn keywords(text: &str, n: usize) -> Vec<String> {
    let mut ranked: Vec<(String, (usize, usize))> = frequencies(text).into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().take(n).map(|(term, _)| term).collect()
}

/// Extractive summary: the `n` best sentences in document order, one per line.
///
/// A sentence scores by how many of the text's keywords it contains (weighted
/// by keyword frequency, normalized by sentence length) plus its overlap with
/// the title's content words.
pub fn summarize(title: &str, text: &str, n: usize) -> String {
    let all = sentences(text);
    if all.len() <= n {
        return all.join("\n");
    }

    let freq = frequencies(text);
    let top: HashSet<String> = keywords(text, KEYWORD_COUNT).into_iter().collect();
    let total_top: usize = top.iter().filter_map(|k| freq.get(k)).map(|f| f.0).sum();
    let title_terms: HashSet<String> = terms(title).collect();

    let mut scored: Vec<(usize, f64)> = all
        .iter()
        .enumerate()
        .map(|(idx, sentence)| {
            let words: Vec<String> = terms(sentence).collect();
            if words.is_empty() {
                return (idx, 0.0);
            }
            let keyword_hits: usize = words
                .iter()
                .filter(|w| top.contains(*w))
                .filter_map(|w| freq.get(w))
                .map(|f| f.0)
                .sum();
            let keyword_score = if total_top == 0 {
                0.0
            } else {
                keyword_hits as f64 / total_top as f64 / words.len() as f64 * 10.0
            };
            let title_score = if title_terms.is_empty() {
                0.0
            } else {
                words.iter().filter(|w| title_terms.contains(*w)).count() as f64
                    / title_terms.len() as f64
            };
            (idx, keyword_score + title_score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let mut chosen: Vec<usize> = scored.into_iter().take(n).map(|(idx, _)| idx).collect();
    chosen.sort_unstable();
    chosen
        .into_iter()
        .map(|idx| all[idx].as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First three sentences joined by single spaces when there are more than
/// three; otherwise the whole text.
pub fn lead_summary(text: &str) -> String {
    let all = sentences(text);
    if all.len() > 3 {
        all[..3].join(" ")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sentences_split_on_terminal_punctuation() {
        let text = "The council met today. It approved the budget! Was it wise? Nobody knows.";
        assert_eq!(
            sentences(text),
            vec![
                "The council met today.",
                "It approved the budget!",
                "Was it wise?",
                "Nobody knows."
            ]
        );
    }

    #[test]
    fn lead_summary_takes_three_of_four() {
        let text = "One fish swam. Two fish swam. Red fish swam. Blue fish swam.";
        assert_eq!(
            lead_summary(text),
            "One fish swam. Two fish swam. Red fish swam."
        );
    }

    #[test]
    fn lead_summary_keeps_short_text_whole() {
        let text = "Only one sentence here.\nAnd another.";
        assert_eq!(lead_summary(text), text);
    }

    #[test]
    fn stopwords_are_case_insensitive() {
        assert!(is_stopword("The"));
        assert!(is_stopword("and"));
        assert!(!is_stopword("budget"));
        assert_eq!(stopword_count("The cat and the hat"), 3);
    }

    #[test]
    fn keywords_rank_by_frequency_then_order() {
        let text = "Budget talks stall. Budget deadline looms. Senators meet on budget. \
                    Senators disagree about the deadline.";
        let kw = keywords(text, 3);
        assert_eq!(kw, vec!["budget", "deadline", "senators"]);
    }

    #[test]
    fn keywords_skip_numbers_and_single_letters() {
        let kw = keywords("2024 2024 2024 a b c storm storm", 10);
        assert_eq!(kw, vec!["storm"]);
    }

    #[test]
    fn summarize_returns_all_sentences_when_few() {
        let text = "First point made. Second point made.";
        assert_eq!(summarize("Title", text, 5), "First point made.\nSecond point made.");
    }

    #[test]
    fn summarize_picks_relevant_sentences_in_document_order() {
        let text = "Weather was mild. The river flood hit the town. Lunch was served. \
                    Flood waters rose over the river banks. Children played outside. \
                    The flood damaged river homes. Birds sang.";
        let summary = summarize("River flood damages town", text, 2);
        let lines: Vec<_> = summary.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.contains("flood") || l.contains("Flood")));
        let first = text.find(lines[0]).unwrap();
        let second = text.find(lines[1]).unwrap();
        assert!(first < second);
    }
}
