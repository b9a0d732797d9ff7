// src/services/classifier.rs

//! Seller code classification.
//!
//! Operator-entered codes are inconsistent: extra separators, missing
//! numbers, reordered tokens. Two strategies sit behind [`CodeClassifier`]:
//!
//! - [`StandardClassifier`]: an ordered token cascade. The order of the
//!   stages is significant and must not be merged into one pattern.
//! - [`LegacyClassifier`]: a single "has a 3–6 digit run" regex with a
//!   stricter emptiness pattern.
//!
//! Only ASCII digits form a number under either strategy.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{ClassifierStrategy, CodeAnalysis, CodeClass};

/// Common contract for code classification strategies.
pub trait CodeClassifier: Send + Sync {
    /// Strategy name for logs.
    fn name(&self) -> &'static str;

    /// Classify a code and recover its prefix and numeric id.
    fn analyze(&self, code: &str) -> CodeAnalysis;

    /// Classify a code.
    fn classify(&self, code: &str) -> CodeClass {
        self.analyze(code).class
    }
}

/// Build the classifier selected by configuration.
pub fn classifier_for(strategy: ClassifierStrategy) -> Box<dyn CodeClassifier> {
    match strategy {
        ClassifierStrategy::Standard => Box::new(StandardClassifier),
        ClassifierStrategy::Legacy => Box::new(LegacyClassifier),
    }
}

struct Patterns {
    standard_empty: Regex,
    legacy_number: Regex,
    legacy_prefix: Regex,
    legacy_empty: Regex,
    digit_run: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();

    PATTERNS.get_or_init(|| {
        // Fixed patterns; the unit tests below exercise every one of them.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("classifier: invalid regex")
        }

        Patterns {
            standard_empty: re(r"^[A-Z]{2,3}(?:[\s-][\sA-Za-z0-9-]*)?$"),
            legacy_number: re(r"(?-u:\b)([0-9]{3,6})(?-u:\b)"),
            legacy_prefix: re(r"^([A-Z]{2,3})(?:[\s-]|$)"),
            legacy_empty: re(r"^[A-Z]{2,3}\s*(?:-+\s*)+[A-Z0-9]*$"),
            digit_run: re(r"[0-9]{3,6}"),
        }
    })
}

/// Split a code into tokens, treating any run of spaces or hyphens as one separator.
pub fn tokenize(code: &str) -> Vec<&str> {
    code.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_prefix_token(token: &str) -> bool {
    (2..=3).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_uppercase())
}

fn is_numeric_id(token: &str) -> bool {
    (3..=6).contains(&token.len()) && is_all_digits(token)
}

fn is_all_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Ordered token cascade, first match wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardClassifier;

impl CodeClassifier for StandardClassifier {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn analyze(&self, code: &str) -> CodeAnalysis {
        let code = code.trim();
        let tokens = tokenize(code);

        let prefix = tokens
            .first()
            .filter(|t| is_prefix_token(t))
            .map(|t| t.to_string());
        let after_prefix = if prefix.is_some() { &tokens[1..] } else { &tokens[..] };

        // 1. canonical id right after the prefix
        // 2. a 3-6 digit token anywhere
        // 3. any all-digit token, scanning from the end
        let number = after_prefix
            .iter()
            .find(|t| is_numeric_id(t))
            .or_else(|| tokens.iter().find(|t| is_numeric_id(t)))
            .or_else(|| tokens.iter().rev().find(|t| is_all_digits(t)));

        if let Some(number) = number {
            return CodeAnalysis::valid(prefix, *number);
        }

        let p = patterns();
        if code.is_empty() || (p.standard_empty.is_match(code) && !p.digit_run.is_match(code)) {
            CodeAnalysis::empty(prefix)
        } else {
            CodeAnalysis::malformed(prefix)
        }
    }
}

/// Single-regex classifier kept for compatibility with older reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyClassifier;

impl CodeClassifier for LegacyClassifier {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn analyze(&self, code: &str) -> CodeAnalysis {
        let code = code.trim();
        let p = patterns();

        let prefix = p
            .legacy_prefix
            .captures(code)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        if let Some(number) = p.legacy_number.captures(code).and_then(|caps| caps.get(1)) {
            return CodeAnalysis::valid(prefix, number.as_str());
        }

        if code.is_empty() || (p.legacy_empty.is_match(code) && !p.digit_run.is_match(code)) {
            CodeAnalysis::empty(prefix)
        } else {
            CodeAnalysis::malformed(prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inputs both strategies must agree on.
    const COMMON_INPUTS: &[(&str, CodeClass, Option<&str>)] = &[
        ("SF - 123 - refurbished", CodeClass::Valid, Some("123")),
        ("SF - 12345 - M9", CodeClass::Valid, Some("12345")),
        ("DD - 4145 - G4 (lot of 2)", CodeClass::Valid, Some("4145")),
        ("MC - 2923", CodeClass::Valid, Some("2923")),
        ("KG-7769-HDD", CodeClass::Valid, Some("7769")),
        ("SF - - -", CodeClass::Empty, None),
        ("SF--M9", CodeClass::Empty, None),
        ("", CodeClass::Empty, None),
        ("SF###bad", CodeClass::Malformed, None),
        ("SF - ١٢٣", CodeClass::Malformed, None),
    ];

    #[test]
    fn test_tokenize_collapses_separators() {
        assert_eq!(tokenize(" SF -- 123  - A1 "), vec!["SF", "123", "A1"]);
        assert!(tokenize(" - - ").is_empty());
    }

    #[test]
    fn test_standard_examples() {
        let c = StandardClassifier;
        assert_eq!(c.classify("SF - 123 - refurbished"), CodeClass::Valid);
        assert_eq!(c.classify("SF - - -"), CodeClass::Empty);
        assert_eq!(c.classify("SF###bad"), CodeClass::Malformed);
    }

    #[test]
    fn test_standard_prefix_then_number() {
        let analysis = StandardClassifier.analyze("SF - 7682 - A1");
        assert_eq!(analysis.prefix.as_deref(), Some("SF"));
        assert_eq!(analysis.number.as_deref(), Some("7682"));
        assert_eq!(analysis.formatted().as_deref(), Some("SF 7682"));
    }

    #[test]
    fn test_standard_number_after_other_tokens() {
        let analysis = StandardClassifier.analyze("JW - M9 Shelf C 3890");
        assert_eq!(analysis.class, CodeClass::Valid);
        assert_eq!(analysis.number.as_deref(), Some("3890"));
    }

    #[test]
    fn test_standard_number_without_prefix() {
        let analysis = StandardClassifier.analyze("4521 - B2");
        assert_eq!(analysis.prefix, None);
        assert_eq!(analysis.number.as_deref(), Some("4521"));
    }

    #[test]
    fn test_standard_prefers_first_id_after_prefix() {
        let analysis = StandardClassifier.analyze("SF - 111 - 222");
        assert_eq!(analysis.number.as_deref(), Some("111"));
    }

    #[test]
    fn test_standard_last_resort_any_length_from_end() {
        let analysis = StandardClassifier.analyze("SF - 12 - 1234567");
        assert_eq!(analysis.class, CodeClass::Valid);
        assert_eq!(analysis.number.as_deref(), Some("1234567"));
        assert_eq!(analysis.digit_fragment(), None);

        let short = StandardClassifier.analyze("SF - 7 - 42");
        assert_eq!(short.number.as_deref(), Some("42"));
    }

    #[test]
    fn test_standard_empty_shapes() {
        let c = StandardClassifier;
        assert_eq!(c.classify("JW - M9 Shelf C"), CodeClass::Empty);
        assert_eq!(c.classify("XX - Location"), CodeClass::Empty);
        assert_eq!(c.classify("SF"), CodeClass::Empty);
        assert_eq!(c.classify("   "), CodeClass::Empty);
    }

    #[test]
    fn test_standard_malformed_shapes() {
        let c = StandardClassifier;
        assert_eq!(c.classify("ABC123"), CodeClass::Malformed);
        assert_eq!(c.classify("SF - M1234"), CodeClass::Malformed);
        assert_eq!(c.classify("sf - m9"), CodeClass::Malformed);
        assert_eq!(c.classify("?? - ??"), CodeClass::Malformed);
    }

    #[test]
    fn test_legacy_examples() {
        let c = LegacyClassifier;
        assert_eq!(c.classify("SF - 123 - refurbished"), CodeClass::Valid);
        assert_eq!(c.classify("SF - - -"), CodeClass::Empty);
        assert_eq!(c.classify("SF###bad"), CodeClass::Malformed);
    }

    #[test]
    fn test_legacy_is_stricter_about_empty() {
        let c = LegacyClassifier;
        assert_eq!(c.classify("SF--M9"), CodeClass::Empty);
        assert_eq!(c.classify("JW - M9 Shelf C"), CodeClass::Malformed);
        assert_eq!(c.classify("SF"), CodeClass::Malformed);
    }

    #[test]
    fn test_legacy_requires_bounded_run() {
        let c = LegacyClassifier;
        assert_eq!(c.classify("SF - 1234567"), CodeClass::Malformed);
        assert_eq!(c.analyze("KG-7769-HDD").prefix.as_deref(), Some("KG"));
    }

    #[test]
    fn test_only_ascii_digits_form_a_number() {
        // Arabic-Indic and fullwidth digits are not seller code numbers.
        for code in ["SF - ١٢٣", "SF - １２３４", "SF - 12٣"] {
            let strategies: [&dyn CodeClassifier; 2] = [&StandardClassifier, &LegacyClassifier];
            for classifier in strategies {
                let analysis = classifier.analyze(code);
                assert_eq!(
                    analysis.class,
                    CodeClass::Malformed,
                    "{} on {:?}",
                    classifier.name(),
                    code
                );
                assert_eq!(analysis.number, None);
            }
        }
    }

    #[test]
    fn test_strategies_agree_on_common_inputs() {
        let strategies = [
            classifier_for(ClassifierStrategy::Standard),
            classifier_for(ClassifierStrategy::Legacy),
        ];
        for (code, class, number) in COMMON_INPUTS {
            for classifier in &strategies {
                let analysis = classifier.analyze(code);
                assert_eq!(analysis.class, *class, "{} on {:?}", classifier.name(), code);
                assert_eq!(
                    analysis.number.as_deref(),
                    *number,
                    "{} on {:?}",
                    classifier.name(),
                    code
                );
            }
        }
    }
}
