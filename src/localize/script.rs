use std::sync::OnceLock;

use regex::Regex;

// Hiragana, katakana and the CJK unified ideograph block.
const JAPANESE_RANGES: &str = r"[\u{3040}-\u{30FF}\u{4E00}-\u{9FFF}]";

fn japanese_matcher() -> &'static Regex {
    static MATCHER: OnceLock<Regex> = OnceLock::new();
    MATCHER.get_or_init(|| Regex::new(JAPANESE_RANGES).expect("valid character class"))
}

/// Does the text already contain Japanese-script characters?
pub fn contains_japanese(text: &str) -> bool {
    japanese_matcher().is_match(text)
}
