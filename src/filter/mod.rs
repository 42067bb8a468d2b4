/// Which of the configured keywords appear in the entry text?
///
/// Case-sensitive literal substring match, in keyword-list order. Blank
/// keywords never match; they are rejected at the admin boundary but a
/// hand-edited database must not make every entry match.
pub fn matching_keywords<'a>(text: &str, keywords: &'a [String]) -> Vec<&'a str> {
    keywords
        .iter()
        .filter(|kw| !kw.is_empty())
        .filter(|kw| text.contains(kw.as_str()))
        .map(|kw| kw.as_str())
        .collect()
}
