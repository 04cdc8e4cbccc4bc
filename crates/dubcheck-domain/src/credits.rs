//! Credit pricing for fact-check submissions
//!
//! Cost is tiered by word count, where a word is any whitespace-delimited
//! token.

/// Upper word bounds (inclusive) and the credits charged within them.
/// Anything longer than the last bound costs [`MAX_COST`].
const COST_TABLE: [(usize, u32); 3] = [(50, 1), (200, 2), (500, 3)];

/// Credits charged for texts longer than the last table entry
pub const MAX_COST: u32 = 5;

/// Count whitespace-delimited tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Credits needed to fact-check `text`
///
/// # Examples
///
/// ```
/// use dubcheck_domain::cost_of;
///
/// assert_eq!(cost_of("one two three"), 1);
/// assert_eq!(cost_of(&"word ".repeat(501)), 5);
/// ```
pub fn cost_of(text: &str) -> u32 {
    cost_for_words(word_count(text))
}

/// Credits charged for a given word count
pub fn cost_for_words(words: usize) -> u32 {
    COST_TABLE
        .iter()
        .find(|(limit, _)| words <= *limit)
        .map(|(_, cost)| *cost)
        .unwrap_or(MAX_COST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn words(n: usize) -> String {
        vec!["claim"; n].join(" ")
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(cost_of(&words(50)), 1);
        assert_eq!(cost_of(&words(51)), 2);
        assert_eq!(cost_of(&words(200)), 2);
        assert_eq!(cost_of(&words(201)), 3);
        assert_eq!(cost_of(&words(500)), 3);
        assert_eq!(cost_of(&words(501)), 5);
    }

    #[test]
    fn test_empty_text_costs_one() {
        assert_eq!(word_count(""), 0);
        assert_eq!(cost_of(""), 1);
        assert_eq!(cost_of("   \n\t "), 1);
    }

    #[test]
    fn test_mixed_whitespace() {
        assert_eq!(word_count("the\tmoon  is\nmade\r\nof cheese"), 6);
    }

    proptest! {
        #[test]
        fn prop_cost_matches_tier(n in 0usize..1500) {
            let expected = match n {
                0..=50 => 1,
                51..=200 => 2,
                201..=500 => 3,
                _ => 5,
            };
            prop_assert_eq!(cost_for_words(n), expected);
        }

        #[test]
        fn prop_cost_is_monotonic(a in 0usize..1500, b in 0usize..1500) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(cost_for_words(lo) <= cost_for_words(hi));
        }

        #[test]
        fn prop_word_count_ignores_spacing(n in 0usize..300, pad in 1usize..4) {
            let text = vec!["w"; n].join(&" ".repeat(pad));
            prop_assert_eq!(word_count(&text), n);
        }
    }
}
