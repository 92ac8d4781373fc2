use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

/// Wildcard marker stripped from raw input; the planner adds its own wildcards.
pub const WILDCARD_MARKER: char = '*';

/// Normalize text for indexing and querying.
///
/// - strips the wildcard marker (`*`)
/// - lowercases
/// - NFD-decomposes and drops non-spacing marks ("é" → "e"); spacing
///   marks such as Devanagari vowel signs are kept
/// - trims and collapses whitespace runs to a single space
///
/// The result is a fixed point: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let folded: String = text
        .chars()
        .filter(|c| *c != WILDCARD_MARKER)
        .collect::<String>()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_nonspacing_mark(*c))
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_nonspacing_mark(c: char) -> bool {
    c.general_category() == GeneralCategory::NonspacingMark
}
