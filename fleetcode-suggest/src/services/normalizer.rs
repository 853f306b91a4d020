//! Text Normalizer
//!
//! Turns part names, descriptions and inspection notes into the ordered token
//! list the matcher works on. Pure and deterministic; running it again on the
//! space-joined output yields the same tokens.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Shop-floor abbreviations and their expansions
///
/// Keys must start and end with a word character (whole-word replacement).
/// No expansion may contain a key, otherwise normalization stops being idempotent.
pub const ABBREVIATIONS: &[(&str, &str)] = &[
    ("a/c", "air conditioning"),
    ("w/s", "windshield"),
    ("ac", "air conditioning"),
    ("brk", "brake"),
    ("brks", "brakes"),
    ("chmbr", "chamber"),
    ("assy", "assembly"),
    ("trans", "transmission"),
    ("xmsn", "transmission"),
    ("eng", "engine"),
    ("susp", "suspension"),
    ("strg", "steering"),
    ("whl", "wheel"),
    ("brg", "bearing"),
    ("brng", "bearing"),
    ("frt", "front"),
    ("rr", "rear"),
    ("lh", "left"),
    ("rh", "right"),
    ("alt", "alternator"),
    ("batt", "battery"),
    ("rad", "radiator"),
    ("exh", "exhaust"),
    ("fltr", "filter"),
    ("pmp", "pump"),
    ("comp", "compressor"),
    ("cmpr", "compressor"),
    ("hyd", "hydraulic"),
    ("elec", "electrical"),
    ("lt", "light"),
    ("hdlt", "headlight"),
    ("mtr", "motor"),
    ("sw", "switch"),
    ("sol", "solenoid"),
    ("vlv", "valve"),
    ("gskt", "gasket"),
    ("brkt", "bracket"),
    ("cyl", "cylinder"),
    ("drm", "drum"),
    ("pd", "pad"),
    ("adj", "adjuster"),
    ("strtr", "starter"),
    ("thermo", "thermostat"),
    ("wtr", "water"),
    ("inj", "injector"),
    ("turbo", "turbocharger"),
    ("shk", "shock"),
    ("def", "diesel exhaust fluid"),
    ("dpf", "diesel particulate filter"),
    ("egr", "exhaust gas recirculation"),
];

/// Words that carry no classification signal
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in", "is",
    "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "will", "with",
    "per", "each", "ea", "qty", "pcs", "pc", "new", "used", "oem", "part", "parts", "item",
    "items", "replace", "replaced", "replacement", "need", "needs", "see",
];

/// Everything except word characters, whitespace, `/` and `-`
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\s/\-]").expect("punctuation pattern is valid")
});

static ABBREVIATION_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    ABBREVIATIONS
        .iter()
        .map(|(abbr, expansion)| {
            let pattern = format!(r"\b{}\b", regex::escape(abbr));
            (
                Regex::new(&pattern).expect("abbreviation pattern is valid"),
                *expansion,
            )
        })
        .collect()
});

static STOP_WORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Normalize text into an ordered token list (duplicates kept)
pub fn normalize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut cleaned = PUNCTUATION.replace_all(&lowered, " ").into_owned();

    for (pattern, expansion) in ABBREVIATION_PATTERNS.iter() {
        if pattern.is_match(&cleaned) {
            cleaned = pattern.replace_all(&cleaned, *expansion).into_owned();
        }
    }

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() >= 2 && !STOP_WORD_SET.contains(token))
        .map(str::to_string)
        .collect()
}

/// Join tokens the way the matcher searches multi-word phrases
pub fn join_tokens(tokens: &[String]) -> String {
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expands_abbreviations() {
        let tokens = normalize("brk chmbr leaking");
        assert_eq!(tokens, vec!["brake", "chamber", "leaking"]);
    }

    #[test]
    fn test_strips_punctuation_keeps_slash_and_dash() {
        let tokens = normalize("U-Bolt, 5/8\" (rear)!");
        assert_eq!(tokens, vec!["u-bolt", "5/8", "rear"]);
    }

    #[test]
    fn test_slash_abbreviation() {
        let tokens = normalize("A/C compressor clutch");
        assert_eq!(tokens, vec!["air", "conditioning", "compressor", "clutch"]);
    }

    #[test]
    fn test_whole_word_only() {
        // "brk" inside "brkt" must not be expanded as brake
        let tokens = normalize("brkt");
        assert_eq!(tokens, vec!["bracket"]);

        let tokens = normalize("track");
        assert_eq!(tokens, vec!["track"]);
    }

    #[test]
    fn test_drops_stop_words_and_short_tokens() {
        let tokens = normalize("Replace the x brake pad on a trailer");
        assert_eq!(tokens, vec!["brake", "pad", "trailer"]);
    }

    #[test]
    fn test_empty_and_symbol_only_input() {
        assert!(normalize("").is_empty());
        assert!(normalize("!!! ,,, ...").is_empty());
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "brk chmbr leaking",
            "LH frt whl brg noisy; a/c inop",
            "Fuel fltr assy w/s wiper mtr",
            "DPF / EGR cooler -- hyd pmp",
            "Tire 11R22.5 sidewall bulge, rr axle",
            "a/c/d brk-brk rr rr",
        ];

        for sample in samples {
            let once = normalize(sample);
            let twice = normalize(&join_tokens(&once));
            assert_eq!(once, twice, "Normalization not idempotent for '{}'", sample);
        }
    }

    #[test]
    fn test_expansions_contain_no_abbreviation_keys() {
        let keys: HashSet<&str> = ABBREVIATIONS.iter().map(|(k, _)| *k).collect();
        for (abbr, expansion) in ABBREVIATIONS {
            for word in expansion.split_whitespace() {
                assert!(
                    !keys.contains(word),
                    "Expansion of '{}' contains abbreviation '{}'",
                    abbr,
                    word
                );
            }
        }
    }
}
