use once_cell::sync::Lazy;
use regex::Regex;

/// " - Reuters", " — Bloomberg", ": CNBC", " | MarketWatch" at the end of a headline.
static SOURCE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+[\-–—:|]\s*[^\-–—:|]{2,80}$").expect("source suffix pattern is valid")
});
static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Reduces a headline to a comparison key: outlet suffix stripped,
/// punctuation removed, whitespace collapsed, lower-cased.
pub fn normalize(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return String::new();
    }

    let title = SOURCE_SUFFIX.replace(title, "");
    let title = PUNCTUATION.replace_all(&title, "");
    let title = WHITESPACE.replace_all(title.trim(), " ");
    title.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_source_suffix() {
        assert_eq!(normalize("Fed Cuts Rates - Reuters"), "fed cuts rates");
        assert_eq!(normalize("Fed Cuts Rates — Bloomberg"), "fed cuts rates");
        assert_eq!(normalize("Fed Cuts Rates – The Wall Street Journal"), "fed cuts rates");
        assert_eq!(normalize("Fed Cuts Rates | MarketWatch"), "fed cuts rates");
        assert_eq!(normalize("Fed Cuts Rates : CNBC"), "fed cuts rates");
    }

    #[test]
    fn test_only_the_last_suffix_goes() {
        assert_eq!(
            normalize("Microsoft - Activision deal closes - Yahoo Finance"),
            "microsoft activision deal closes"
        );
    }

    #[test]
    fn test_short_or_long_tails_are_kept() {
        // a single character after the separator is not an outlet name
        assert_eq!(normalize("Apple stock -A"), "apple stock a");
        let long_tail = "x".repeat(81);
        let title = format!("Apple stock - {}", long_tail);
        assert_eq!(normalize(&title), format!("apple stock {}", long_tail));
    }

    #[test]
    fn test_separator_needs_leading_whitespace() {
        assert_eq!(normalize("AI-driven rally lifts Nasdaq"), "aidriven rally lifts nasdaq");
        assert_eq!(normalize("Fed Cuts Rates: CNBC"), "fed cuts rates cnbc");
    }

    #[test]
    fn test_punctuation_and_case() {
        assert_eq!(normalize("Fed Cuts Rates!!"), normalize("Fed cuts rates"));
        assert_eq!(normalize("  Apple's   Q3:\tbeats   estimates?  "), "apples q3 beats estimates");
        assert_eq!(normalize("Meta & Google  face EU inquiry"), "meta google face eu inquiry");
    }

    #[test]
    fn test_keeps_unicode_word_characters() {
        assert_eq!(normalize("Börse schließt höher"), "börse schließt höher");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn test_idempotent() {
        let titles = [
            "Fed Cuts Rates - Reuters",
            "Meta & Google  face EU inquiry | Financial Times",
            "S&P 500: record close — again",
            "Börse schließt höher",
            "",
        ];
        for title in titles {
            let once = normalize(title);
            assert_eq!(normalize(&once), once, "not idempotent for {title}");
        }
    }
}
