//! Keyword relevance ranking.
//!
//! Pure functions over a candidate list: a textual relevance score against
//! the page name and service hints, the search/"relevant only" filter, and
//! the four sort modes of the keyword selector. Nothing here holds state.

use std::cmp::{Ordering, Reverse};

use serde::Serialize;

use crate::models::keyword::{Keyword, KeywordQuery, RankContext, SortMode};

/// Points for a keyword containing the whole hint text.
const FULL_MATCH_POINTS: u32 = 10;

/// Points for each hint word found in the keyword.
const WORD_MATCH_POINTS: u32 = 3;

/// Hint words this short or shorter never score.
const MIN_WORD_CHARS: usize = 2;

/// A candidate together with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedKeyword {
    #[serde(flatten)]
    pub keyword: Keyword,
    pub relevance: u32,
}

/// Score a keyword against the page name and service hints.
///
/// Each hint contributes +10 when the keyword contains it entirely and +3
/// for every hint word longer than two characters that the keyword
/// contains. Matching is case-insensitive substring containment. Blank
/// hints contribute nothing, although every keyword trivially contains the
/// empty string.
pub fn relevance_score(keyword: &str, ctx: &RankContext) -> u32 {
    let keyword = keyword.to_lowercase();

    [ctx.page_name.as_str(), ctx.service.as_str()]
        .into_iter()
        .map(|hint| hint_score(&keyword, &hint.to_lowercase()))
        .sum()
}

fn hint_score(keyword: &str, hint: &str) -> u32 {
    if hint.trim().is_empty() {
        return 0;
    }

    let mut score = 0;
    if keyword.contains(hint) {
        score += FULL_MATCH_POINTS;
    }
    score += hint
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_WORD_CHARS)
        .filter(|word| keyword.contains(word))
        .count() as u32
        * WORD_MATCH_POINTS;
    score
}

/// Case-insensitive substring match against the raw search box input.
pub fn matches_search(keyword: &str, search: &str) -> bool {
    search.is_empty() || keyword.to_lowercase().contains(&search.to_lowercase())
}

/// The "relevant only" rule of the selector.
///
/// A keyword is relevant when it contains the page name or the service, or
/// when the page name or the service contains the keyword's first
/// space-separated word. Only the first word is checked.
pub fn is_relevant(keyword: &str, ctx: &RankContext) -> bool {
    let keyword = keyword.to_lowercase();
    let page_name = ctx.page_name.to_lowercase();
    let service = ctx.service.to_lowercase();

    let contains_hint = |hint: &str| !hint.trim().is_empty() && keyword.contains(hint);
    if contains_hint(&page_name) || contains_hint(&service) {
        return true;
    }

    let first_word = keyword.split(' ').next().unwrap_or_default();
    !first_word.is_empty() && (page_name.contains(first_word) || service.contains(first_word))
}

/// Apply the search box and the optional "relevant only" toggle, keeping
/// candidate order.
pub fn filter_keywords<'a>(
    candidates: &'a [Keyword],
    ctx: &RankContext,
    query: &KeywordQuery,
) -> Vec<&'a Keyword> {
    candidates
        .iter()
        .filter(|k| matches_search(&k.keyword, &query.search))
        .filter(|k| !query.relevant_only || is_relevant(&k.keyword, ctx))
        .collect()
}

/// Sort a filtered view in place. Every mode is stable, so ties keep the
/// order they arrived in.
pub fn sort_keywords(keywords: &mut [&Keyword], mode: SortMode, ctx: &RankContext) {
    match mode {
        SortMode::Relevance => {
            keywords.sort_by_key(|k| Reverse(relevance_score(&k.keyword, ctx)));
        }
        SortMode::Volume => {
            keywords.sort_by_key(|k| Reverse(k.search_volume.unwrap_or(0)));
        }
        SortMode::Difficulty => {
            keywords.sort_by(|a, b| {
                a.difficulty
                    .unwrap_or(0.0)
                    .total_cmp(&b.difficulty.unwrap_or(0.0))
            });
        }
        SortMode::Alphabetical => keywords.sort_by(|a, b| alphabetical(&a.keyword, &b.keyword)),
    }
}

/// Case-insensitive ordering; keywords differing only in case fall back to
/// a byte comparison so the order is total.
fn alphabetical(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Filter, sort and score a candidate list the way the selector displays it.
pub fn ranked_view(
    candidates: &[Keyword],
    ctx: &RankContext,
    query: &KeywordQuery,
    mode: SortMode,
) -> Vec<RankedKeyword> {
    let mut view = filter_keywords(candidates, ctx, query);
    sort_keywords(&mut view, mode, ctx);

    view.into_iter()
        .map(|k| RankedKeyword {
            keyword: k.clone(),
            relevance: relevance_score(&k.keyword, ctx),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plumbing() -> RankContext {
        RankContext::new("Plumbing Services", "plumbing")
    }

    fn names(view: &[&Keyword]) -> Vec<String> {
        view.iter().map(|k| k.keyword.clone()).collect()
    }

    #[test]
    fn test_full_and_word_matches() {
        let ctx = plumbing();
        // "plumbing services" contains the page name (+10), its two words (+6),
        // the service (+10) and the service word (+3).
        assert_eq!(relevance_score("Plumbing Services Austin", &ctx), 29);
        // The service matches fully; only "plumbing" of the page name does.
        assert_eq!(relevance_score("emergency plumbing", &ctx), 10 + 3 + 3);
        assert_eq!(relevance_score("plumber austin", &ctx), 0);
    }

    #[test]
    fn test_short_words_do_not_score() {
        let ctx = RankContext::new("AC of TX", "");
        assert_eq!(relevance_score("ac repair of houston", &ctx), 0);
        assert_eq!(relevance_score("best ac of tx", &ctx), 10);
    }

    #[test]
    fn test_blank_hints_score_nothing() {
        let ctx = RankContext::default();
        assert_eq!(relevance_score("anything at all", &ctx), 0);
        assert!(!is_relevant("anything at all", &ctx));
    }

    #[test]
    fn test_score_is_case_insensitive() {
        let ctx = plumbing();
        assert_eq!(
            relevance_score("PLUMBING near me", &ctx),
            relevance_score("plumbing near me", &ctx)
        );
    }

    #[test]
    fn test_relevant_only_checks_first_word() {
        let ctx = plumbing();
        // Contains the service.
        assert!(is_relevant("plumbing cost", &ctx));
        // "services" is the second word, so it is not checked.
        assert!(!is_relevant("home services", &ctx));
        // First word "plumb" is a substring of the service.
        assert!(is_relevant("plumb repair", &ctx));
        assert!(!is_relevant("water heater", &ctx));
    }

    #[test]
    fn test_filter_requires_search_and_relevance() {
        let ctx = plumbing();
        let candidates = vec![
            Keyword::new("plumbing repair"),
            Keyword::new("water heater repair"),
            Keyword::new("plumbing supplies"),
        ];
        let query = KeywordQuery {
            search: "REPAIR".to_string(),
            relevant_only: false,
        };
        assert_eq!(
            names(&filter_keywords(&candidates, &ctx, &query)),
            vec!["plumbing repair", "water heater repair"]
        );

        let query = KeywordQuery {
            search: "repair".to_string(),
            relevant_only: true,
        };
        assert_eq!(
            names(&filter_keywords(&candidates, &ctx, &query)),
            vec!["plumbing repair"]
        );
    }

    #[test]
    fn test_sort_by_volume_and_difficulty_defaults() {
        let ctx = plumbing();
        let candidates = vec![
            Keyword::new("a").with_volume(10).with_difficulty(40.0),
            Keyword::new("b"),
            Keyword::new("c").with_volume(900).with_difficulty(5.0),
        ];
        let mut view: Vec<&Keyword> = candidates.iter().collect();

        sort_keywords(&mut view, SortMode::Volume, &ctx);
        assert_eq!(names(&view), vec!["c", "a", "b"]);

        sort_keywords(&mut view, SortMode::Difficulty, &ctx);
        assert_eq!(names(&view), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_relevance_sort_is_stable() {
        let ctx = plumbing();
        let candidates = vec![
            Keyword::new("zeta"),
            Keyword::new("plumbing cost"),
            Keyword::new("alpha"),
            Keyword::new("plumbing help"),
        ];
        let mut view: Vec<&Keyword> = candidates.iter().collect();
        sort_keywords(&mut view, SortMode::Relevance, &ctx);
        assert_eq!(
            names(&view),
            vec!["plumbing cost", "plumbing help", "zeta", "alpha"]
        );
    }

    #[test]
    fn test_alphabetical_round_trip_through_relevance() {
        let ctx = plumbing();
        let candidates = vec![
            Keyword::new("Plumbing services"),
            Keyword::new("drain cleaning"),
            Keyword::new("plumbing Services"),
            Keyword::new("Emergency plumber"),
            Keyword::new("boiler"),
        ];
        let mut view: Vec<&Keyword> = candidates.iter().collect();

        sort_keywords(&mut view, SortMode::Alphabetical, &ctx);
        let first = names(&view);
        assert_eq!(
            first,
            vec![
                "boiler",
                "drain cleaning",
                "Emergency plumber",
                "Plumbing services",
                "plumbing Services"
            ]
        );

        sort_keywords(&mut view, SortMode::Relevance, &ctx);
        sort_keywords(&mut view, SortMode::Alphabetical, &ctx);
        assert_eq!(names(&view), first);
    }

    #[test]
    fn test_ranked_view_attaches_scores() {
        let ctx = plumbing();
        let candidates = vec![Keyword::new("plumber austin"), Keyword::new("plumbing austin")];
        let view = ranked_view(&candidates, &ctx, &KeywordQuery::default(), SortMode::Relevance);

        assert_eq!(view[0].keyword.keyword, "plumbing austin");
        assert_eq!(view[0].relevance, 16);
        assert_eq!(view[1].relevance, 0);
    }
}
