//! Feature Vector Assembly

use crate::components::UrlComponents;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use unicode_properties::{GeneralCategory, GeneralCategoryGroup, UnicodeGeneralCategory};

/// Number of features in the vector
pub const FEATURE_DIMENSION: usize = 30;

/// Feature names in schema order
pub const FEATURE_NAMES: [&str; FEATURE_DIMENSION] = [
    // Lengths
    "length_url",
    "length_hostname",
    "length_path",
    "length_query",
    "length_fragment",
    // Character counts on the raw string
    "num_dots",
    "num_hyphens",
    "num_underscores",
    "num_slashes",
    "num_equals",
    "num_at",
    "num_and",
    "num_exclamation",
    "num_space",
    "num_tilde",
    // Indicators
    "has_https",
    "has_port",
    "has_fragment",
    "has_query",
    "has_digits",
    // Counts
    "num_digits",
    "num_letters",
    "num_parameters",
    "num_fragments",
    "num_subdirectories",
    // Ratios and derived
    "digits_ratio",
    "letters_ratio",
    "special_chars_ratio",
    "directory_length_mean",
    "suspicious_tld",
];

/// Top-level domains treated as suspicious
pub const SUSPICIOUS_TLDS: [&str; 5] = ["xyz", "info", "online", "site", "work"];

/// Characters counted verbatim, in schema order after the length group
const COUNTED_CHARS: [char; 10] = ['.', '-', '_', '/', '=', '@', '&', '!', ' ', '~'];

/// Whether a feature holds a whole number or a fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Count,
    Ratio,
}

impl FeatureKind {
    /// Kind of the feature at `index` in schema order
    pub fn of(index: usize) -> Self {
        match index {
            25..=28 => FeatureKind::Ratio,
            _ => FeatureKind::Count,
        }
    }
}

/// Fixed-schema feature vector for ML inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_DIMENSION],
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl FeatureVector {
    /// Vector with every field set to 0
    pub const fn zeroed() -> Self {
        Self {
            values: [0.0; FEATURE_DIMENSION],
        }
    }

    /// Raw values in schema order
    pub fn values(&self) -> &[f64; FEATURE_DIMENSION] {
        &self.values
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    /// Look up a feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| self.values[i])
    }

    /// `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }

    /// Render the feature at `index` for tabular output.
    ///
    /// Counts print as integers, ratios always carry a decimal point.
    pub fn format_value(&self, index: usize) -> String {
        let value = self.values[index];
        match FeatureKind::of(index) {
            FeatureKind::Count => format!("{}", value as i64),
            FeatureKind::Ratio => format!("{:?}", value),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_DIMENSION))?;
        for (index, (name, value)) in self.iter().enumerate() {
            match FeatureKind::of(index) {
                FeatureKind::Count => map.serialize_entry(name, &(value as i64))?,
                FeatureKind::Ratio => map.serialize_entry(name, &value)?,
            }
        }
        map.end()
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, name) in FEATURE_NAMES.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, self.format_value(index))?;
        }
        Ok(())
    }
}

/// Feature extractor for raw URL strings
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract features from a URL.
    ///
    /// Never fails: a URL whose components cannot be split yields
    /// [`FeatureVector::zeroed`].
    pub fn extract(&self, url: &str) -> FeatureVector {
        match UrlComponents::parse(url) {
            Ok(parts) => Self::assemble(url, &parts),
            Err(_) => FeatureVector::zeroed(),
        }
    }

    fn assemble(url: &str, parts: &UrlComponents) -> FeatureVector {
        let mut values = [0.0; FEATURE_DIMENSION];
        let mut idx = 0;

        let length_url = url.chars().count();
        let num_digits = url.chars().filter(|&c| is_digit(c)).count();
        let num_letters = url.chars().filter(|&c| is_letter(c)).count();

        // Lengths
        values[idx] = length_url as f64; idx += 1;
        values[idx] = char_len(parts.netloc()); idx += 1;
        values[idx] = char_len(parts.path()); idx += 1;
        values[idx] = char_len(parts.query()); idx += 1;
        values[idx] = char_len(parts.fragment()); idx += 1;

        // Character counts
        for target in COUNTED_CHARS {
            values[idx] = url.chars().filter(|&c| c == target).count() as f64;
            idx += 1;
        }

        // Indicators
        values[idx] = flag(parts.scheme() == "https"); idx += 1;
        values[idx] = flag(parts.port().is_some_and(|port| port != 0)); idx += 1;
        values[idx] = flag(!parts.fragment().is_empty()); idx += 1;
        values[idx] = flag(!parts.query().is_empty()); idx += 1;
        values[idx] = flag(num_digits > 0); idx += 1;

        // Counts. Fragment pieces keep empty splits, path segments drop them.
        values[idx] = num_digits as f64; idx += 1;
        values[idx] = num_letters as f64; idx += 1;
        values[idx] = split_count(parts.query(), '&'); idx += 1;
        values[idx] = split_count(parts.fragment(), '#'); idx += 1;
        values[idx] = parts.path_segments().count() as f64; idx += 1;

        // Ratios
        let special = length_url - num_letters - num_digits;
        values[idx] = ratio(num_digits, length_url); idx += 1;
        values[idx] = ratio(num_letters, length_url); idx += 1;
        values[idx] = ratio(special, length_url); idx += 1;
        values[idx] = mean_segment_length(parts); idx += 1;
        values[idx] = flag(SUSPICIOUS_TLDS.contains(&parts.last_label()));

        FeatureVector { values }
    }
}

/// Extract features with the default extractor
pub fn extract_features(url: &str) -> FeatureVector {
    FeatureExtractor::new().extract(url)
}

/// Characters outside `Nd` that still carry a single digit value
/// (superscripts, circled and parenthesized digits and the like).
const DIGIT_VALUED: &[(char, char)] = &[
    ('\u{00B2}', '\u{00B3}'),
    ('\u{00B9}', '\u{00B9}'),
    ('\u{1369}', '\u{1371}'),
    ('\u{19DA}', '\u{19DA}'),
    ('\u{2070}', '\u{2070}'),
    ('\u{2074}', '\u{2079}'),
    ('\u{2080}', '\u{2089}'),
    ('\u{2460}', '\u{2468}'),
    ('\u{2474}', '\u{247C}'),
    ('\u{2488}', '\u{2490}'),
    ('\u{24EA}', '\u{24EA}'),
    ('\u{24F5}', '\u{24FD}'),
    ('\u{24FF}', '\u{24FF}'),
    ('\u{2776}', '\u{277E}'),
    ('\u{2780}', '\u{2788}'),
    ('\u{278A}', '\u{2792}'),
    ('\u{10A40}', '\u{10A43}'),
    ('\u{10E60}', '\u{10E68}'),
    ('\u{11052}', '\u{1105A}'),
    ('\u{1F100}', '\u{1F10A}'),
];

/// Decimal digits plus digit-valued symbols. Fractions, Roman numerals and
/// other numeric characters without a digit value do not count.
fn is_digit(c: char) -> bool {
    c.general_category() == GeneralCategory::DecimalNumber
        || DIGIT_VALUED
            .iter()
            .any(|&(start, end)| (start..=end).contains(&c))
}

/// Letter categories only (`Lu`, `Ll`, `Lt`, `Lm`, `Lo`); combining marks
/// and letter-like numerals are not letters.
fn is_letter(c: char) -> bool {
    c.general_category_group() == GeneralCategoryGroup::Letter
}

fn char_len(s: &str) -> f64 {
    s.chars().count() as f64
}

fn flag(condition: bool) -> f64 {
    if condition { 1.0 } else { 0.0 }
}

fn split_count(s: &str, delimiter: char) -> f64 {
    if s.is_empty() {
        0.0
    } else {
        s.split(delimiter).count() as f64
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

fn mean_segment_length(parts: &UrlComponents) -> f64 {
    let (count, total) = parts
        .path_segments()
        .fold((0usize, 0usize), |(count, total), segment| {
            (count + 1, total + segment.chars().count())
        });
    ratio(total, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn feature(vector: &FeatureVector, name: &str) -> f64 {
        vector.get(name).unwrap()
    }

    #[test]
    fn test_schema_is_fixed() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_DIMENSION);
        let vector = extract_features("https://example.com");
        let names: Vec<_> = vector.iter().map(|(name, _)| name).collect();
        assert_eq!(names, FEATURE_NAMES.to_vec());
    }

    #[test]
    fn test_empty_url_is_all_zero() {
        let vector = extract_features("");
        assert!(vector.is_zero());
        assert_eq!(vector.values().len(), FEATURE_DIMENSION);
    }

    #[test]
    fn test_reference_url() {
        let vector = extract_features("https://example.com/a/b?x=1&y=2#frag");
        assert_eq!(feature(&vector, "length_url"), 36.0);
        assert_eq!(feature(&vector, "length_hostname"), 11.0);
        assert_eq!(feature(&vector, "length_path"), 4.0);
        assert_eq!(feature(&vector, "length_query"), 7.0);
        assert_eq!(feature(&vector, "length_fragment"), 4.0);
        assert_eq!(feature(&vector, "has_https"), 1.0);
        assert_eq!(feature(&vector, "num_slashes"), 4.0);
        assert_eq!(feature(&vector, "num_equals"), 2.0);
        assert_eq!(feature(&vector, "num_and"), 1.0);
        assert_eq!(feature(&vector, "num_parameters"), 2.0);
        assert_eq!(feature(&vector, "num_subdirectories"), 2.0);
        assert_eq!(feature(&vector, "num_fragments"), 1.0);
        assert_eq!(feature(&vector, "has_fragment"), 1.0);
        assert_eq!(feature(&vector, "has_query"), 1.0);
        assert_eq!(feature(&vector, "has_port"), 0.0);
        assert_eq!(feature(&vector, "num_digits"), 2.0);
        assert_eq!(feature(&vector, "has_digits"), 1.0);
        assert_eq!(feature(&vector, "directory_length_mean"), 1.0);
        assert_eq!(feature(&vector, "suspicious_tld"), 0.0);
    }

    #[test]
    fn test_suspicious_tld() {
        let vector = extract_features("http://sub.example.xyz/");
        assert_eq!(feature(&vector, "suspicious_tld"), 1.0);

        let vector = extract_features("http://sub.example.com/");
        assert_eq!(feature(&vector, "suspicious_tld"), 0.0);
    }

    #[test]
    fn test_tld_with_port_is_not_matched() {
        let vector = extract_features("http://example.info:8080/");
        assert_eq!(feature(&vector, "suspicious_tld"), 0.0);
        assert_eq!(feature(&vector, "has_port"), 1.0);
    }

    #[test]
    fn test_zero_port_is_not_counted() {
        let vector = extract_features("http://example.com:0/");
        assert_eq!(feature(&vector, "has_port"), 0.0);
        assert!(!vector.is_zero());
    }

    #[test]
    fn test_relative_url_has_no_authority() {
        let vector = extract_features("login/verify.php");
        assert_eq!(feature(&vector, "length_hostname"), 0.0);
        assert_eq!(feature(&vector, "suspicious_tld"), 0.0);
        assert_eq!(feature(&vector, "num_subdirectories"), 2.0);
    }

    #[test]
    fn test_fragment_counts_empty_pieces() {
        let vector = extract_features("http://a.com/x//y#a##b");
        // "a##b" splits into ["a", "", "b"]
        assert_eq!(feature(&vector, "num_fragments"), 3.0);
        // "/x//y" keeps only ["x", "y"]
        assert_eq!(feature(&vector, "num_subdirectories"), 2.0);
    }

    #[test]
    fn test_root_path_has_zero_mean() {
        let vector = extract_features("http://example.com/");
        assert_eq!(feature(&vector, "directory_length_mean"), 0.0);
        assert_eq!(feature(&vector, "num_subdirectories"), 0.0);
    }

    #[test]
    fn test_counts_include_percent_escapes() {
        let vector = extract_features("http://a.com/%2E%2e.x?q=%20 !~");
        assert_eq!(feature(&vector, "num_dots"), 2.0);
        assert_eq!(feature(&vector, "num_space"), 1.0);
        assert_eq!(feature(&vector, "num_exclamation"), 1.0);
        assert_eq!(feature(&vector, "num_tilde"), 1.0);
    }

    #[test]
    fn test_non_ascii_lengths_count_characters() {
        let vector = extract_features("http://exämple.com/ü");
        assert_eq!(feature(&vector, "length_url"), 20.0);
        assert_eq!(feature(&vector, "length_hostname"), 11.0);
        assert_eq!(feature(&vector, "num_letters"), 15.0);
    }

    #[test]
    fn test_numeric_symbols_are_not_digits() {
        for url in ["http://a.com/\u{BD}", "http://a.com/\u{2167}"] {
            let vector = extract_features(url);
            assert_eq!(feature(&vector, "num_digits"), 0.0, "{url}");
            assert_eq!(feature(&vector, "has_digits"), 0.0, "{url}");
            assert_eq!(feature(&vector, "num_letters"), 8.0, "{url}");
        }

        let vector = extract_features("http://a.com/x\u{B2}");
        assert_eq!(feature(&vector, "num_digits"), 1.0);
        assert_eq!(feature(&vector, "has_digits"), 1.0);
    }

    #[test]
    fn test_combining_marks_are_not_letters() {
        let vector = extract_features("http://a.com/\u{939}\u{93F}\u{928}\u{94D}\u{926}\u{940}");
        assert_eq!(feature(&vector, "num_letters"), 11.0);
        assert_eq!(feature(&vector, "num_digits"), 0.0);
        assert_eq!(feature(&vector, "length_url"), 19.0);

        let sum = feature(&vector, "digits_ratio")
            + feature(&vector, "letters_ratio")
            + feature(&vector, "special_chars_ratio");
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_url_falls_back_to_zero() {
        assert!(extract_features("http://[::1/phish").is_zero());
        assert!(extract_features("http://example.com:99999/").is_zero());
        assert!(extract_features("https://host:port/").is_zero());
        assert!(extract_features("http://exa\u{FF0F}mple.com/x").is_zero());
        assert!(extract_features("http://[::1%a%b]/").is_zero());
    }

    #[test]
    fn test_params_excluded_from_path() {
        let vector = extract_features("http://a.com/login;jsessionid=1");
        assert_eq!(feature(&vector, "length_path"), 6.0);
        assert_eq!(feature(&vector, "num_subdirectories"), 1.0);
    }

    #[test]
    fn test_format_value() {
        let vector = extract_features("http://a.com/b1");
        assert_eq!(vector.format_value(0), "15");
        assert_eq!(vector.format_value(28), "2.0");
        assert_eq!(extract_features("").format_value(25), "0.0");
    }

    #[test]
    fn test_serialize_preserves_order() {
        let json = serde_json::to_string(&extract_features("")).unwrap();
        assert!(json.starts_with("{\"length_url\":0,\"length_hostname\":0"));
        assert!(json.ends_with("\"directory_length_mean\":0.0,\"suspicious_tld\":0}"));
    }

    proptest! {
        #[test]
        fn prop_extract_is_total(url in ".*") {
            let vector = extract_features(&url);
            prop_assert_eq!(vector.values().len(), FEATURE_DIMENSION);
            prop_assert!(vector.values().iter().all(|v| v.is_finite()));
        }

        #[test]
        fn prop_ratios_partition_length(url in "[a-z0-9:/.?&=#_-]{1,64}") {
            let vector = extract_features(&url);
            if !vector.is_zero() {
                let sum = feature(&vector, "digits_ratio")
                    + feature(&vector, "letters_ratio")
                    + feature(&vector, "special_chars_ratio");
                prop_assert!((sum - 1.0).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_extract_is_deterministic(url in "\\PC*") {
            prop_assert_eq!(extract_features(&url), extract_features(&url));
        }
    }
}
