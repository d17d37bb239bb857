// ABOUTME: Chooses one article among the candidates produced by the extraction strategies.
// ABOUTME: Priority order wins when content exists; otherwise the longest partial result.

use tracing::debug;

use crate::article::Article;
use crate::error::ScrapeError;

/// Pick the best candidate for `url`.
///
/// Candidates are in priority order. The first one with non-empty content
/// wins. When none has content, the present candidate with the longest content
/// is returned, ties going to the higher-priority one. With no candidate at
/// all the result is an aggregate failure.
pub fn arbitrate<I>(url: &str, candidates: I) -> Result<Article, ScrapeError>
where
    I: IntoIterator<Item = Option<Article>>,
{
    let mut present: Vec<(usize, Article)> = candidates
        .into_iter()
        .enumerate()
        .filter_map(|(i, c)| c.map(|a| (i, a)))
        .collect();

    if let Some(pos) = present.iter().position(|(_, a)| a.has_content()) {
        let (idx, winner) = present.swap_remove(pos);
        debug!(url, candidate = idx, "picked first candidate with content");
        return Ok(winner);
    }

    let mut best: Option<(usize, Article)> = None;
    for (idx, article) in present {
        let longer = match best {
            Some((_, ref b)) => article.content_len() > b.content_len(),
            None => true,
        };
        if longer {
            best = Some((idx, article));
        }
    }

    match best {
        Some((idx, winner)) => {
            debug!(url, candidate = idx, "no candidate had content; picked longest");
            Ok(winner)
        }
        None => Err(ScrapeError::aggregate(url, "Arbitrate")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const URL: &str = "https://example.com/story";

    fn with_content(content: Option<&str>, title: &str) -> Option<Article> {
        let mut a = Article::new(URL);
        a.title = Some(title.to_string());
        a.content = content.map(str::to_string);
        Some(a)
    }

    #[test]
    fn priority_beats_length() {
        let winner = arbitrate(
            URL,
            [
                with_content(Some("A"), "meta"),
                with_content(Some("BB"), "content"),
                with_content(Some("CCC"), "selector"),
            ],
        )
        .unwrap();
        assert_eq!(winner.content.as_deref(), Some("A"));
        assert_eq!(winner.title.as_deref(), Some("meta"));
    }

    #[test]
    fn skips_missing_and_empty_candidates() {
        let winner = arbitrate(
            URL,
            [None, with_content(Some(""), "content"), with_content(Some("X"), "selector")],
        )
        .unwrap();
        assert_eq!(winner.content.as_deref(), Some("X"));
        assert_eq!(winner.title.as_deref(), Some("selector"));
    }

    #[test]
    fn whitespace_content_still_wins_on_priority() {
        let winner = arbitrate(
            URL,
            [
                with_content(Some("\n"), "meta"),
                with_content(Some("BB"), "content"),
                None,
            ],
        )
        .unwrap();
        assert_eq!(winner.title.as_deref(), Some("meta"));
        assert_eq!(winner.content.as_deref(), Some("\n"));
    }

    #[test]
    fn no_candidates_is_aggregate_failure() {
        let err = arbitrate(URL, [None, None, None]).unwrap_err();
        assert!(err.is_aggregate());
        assert_eq!(err.url, URL);
    }

    #[test]
    fn longest_fallback_keeps_priority_on_ties() {
        let winner = arbitrate(
            URL,
            [
                with_content(None, "meta"),
                with_content(Some(""), "content"),
                None,
            ],
        )
        .unwrap();
        assert_eq!(winner.title.as_deref(), Some("meta"));
    }

    #[test]
    fn longest_fallback_with_only_empty_candidates() {
        let winner = arbitrate(
            URL,
            [
                None,
                with_content(None, "content"),
                with_content(Some(""), "selector"),
            ],
        )
        .unwrap();
        assert_eq!(winner.title.as_deref(), Some("content"));
        assert!(!winner.has_content());
    }
}
