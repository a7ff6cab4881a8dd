//! Single-line product extraction.

use std::sync::Arc;

use super::ExtractionMatch;
use super::patterns::{
    INTEGER, LABELED_GROSS, LABELED_NET, LABELED_PACKAGES, NAME_LEADING_NOISE, NAME_LETTER,
    NAME_SPAN, NAME_TRAILING_LABEL, NAME_TRAILING_NOISE,
};
use crate::models::Product;
use crate::text::collapse_spaces;

const MIN_NAME_CHARS: usize = 3;

const LABELED_CONFIDENCE: f32 = 0.9;
const NAME_ONLY_CONFIDENCE: f32 = 0.2;

/// Numeric fields recovered from a line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericFields {
    pub package_count: Option<f64>,
    pub gross_weight: Option<f64>,
    pub net_weight: Option<f64>,
}

impl NumericFields {
    fn is_empty(&self) -> bool {
        self.package_count.is_none() && self.gross_weight.is_none() && self.net_weight.is_none()
    }
}

/// Policy that maps the unlabeled integers of a line onto product fields.
///
/// The mapping is a guess about column order; implementations report how much
/// the guess should be trusted.
pub trait NumericAssignment: Send + Sync {
    /// Assign fields from positive integers in line order.
    fn assign(&self, numbers: &[u64]) -> NumericFields;

    /// Confidence for an assignment made from `count` numbers.
    fn confidence(&self, count: usize) -> f32 {
        match count {
            0 => NAME_ONLY_CONFIDENCE,
            1 => 0.3,
            2 => 0.4,
            _ => 0.6,
        }
    }
}

/// Default policy: the smallest number is the package count, the last two
/// numbers are gross and net weight.
///
/// With exactly two numbers the larger one becomes the gross weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingWeights;

impl NumericAssignment for TrailingWeights {
    fn assign(&self, numbers: &[u64]) -> NumericFields {
        let mut fields = NumericFields::default();
        let n = numbers.len();

        if n >= 1 {
            fields.package_count = numbers.iter().min().map(|&v| v as f64);
        }
        if n == 2 {
            fields.gross_weight = numbers.iter().max().map(|&v| v as f64);
        }
        if n >= 3 {
            fields.gross_weight = Some(numbers[n - 2] as f64);
            fields.net_weight = Some(numbers[n - 1] as f64);
        }

        fields
    }
}

/// Extracts one product from one line of text.
#[derive(Clone)]
pub struct LineExtractor {
    assignment: Arc<dyn NumericAssignment>,
}

impl LineExtractor {
    /// Create an extractor with the default [`TrailingWeights`] policy.
    pub fn new() -> Self {
        Self {
            assignment: Arc::new(TrailingWeights),
        }
    }

    /// Swap the numeric assignment policy.
    pub fn with_assignment(mut self, assignment: impl NumericAssignment + 'static) -> Self {
        self.assignment = Arc::new(assignment);
        self
    }

    /// Extract a product from `line`, or `None` when no usable name exists.
    pub fn extract(&self, line: &str) -> Option<ExtractionMatch<Product>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let name = extract_name(line)?;

        let (fields, confidence) = match labeled_fields(line) {
            Some(fields) => (fields, LABELED_CONFIDENCE),
            None => {
                let numbers = positive_integers(line);
                let fields = self.assignment.assign(&numbers);
                let confidence = if fields.is_empty() {
                    NAME_ONLY_CONFIDENCE
                } else {
                    self.assignment.confidence(numbers.len())
                };
                (fields, confidence)
            }
        };

        let product = Product {
            name,
            package_count: fields.package_count,
            gross_weight: fields.gross_weight,
            net_weight: fields.net_weight,
        };

        Some(ExtractionMatch::new(product, confidence, line))
    }
}

impl Default for LineExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LineExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineExtractor").finish_non_exhaustive()
    }
}

/// Product name: the text before the first digit, or the longest Cyrillic
/// span when that prefix has no Cyrillic letters.
fn extract_name(line: &str) -> Option<String> {
    let prefix = line
        .find(|c: char| c.is_ascii_digit())
        .map(|idx| clean_name(&line[..idx]))
        .filter(|name| NAME_LETTER.is_match(name));

    let name = match prefix {
        Some(name) => name,
        None => {
            let span = NAME_SPAN
                .find_iter(line)
                .map(|m| m.as_str())
                .max_by_key(|s| s.trim().chars().count())?;
            clean_name(span)
        }
    };

    if name.chars().count() < MIN_NAME_CHARS {
        return None;
    }
    Some(name)
}

fn clean_name(raw: &str) -> String {
    let name = NAME_LEADING_NOISE.replace(raw, "");
    let name = NAME_TRAILING_LABEL.replace(&name, "");
    let name = NAME_TRAILING_NOISE.replace(&name, "");
    collapse_spaces(&name)
}

/// Values written next to their column label. `None` when no label is present.
fn labeled_fields(line: &str) -> Option<NumericFields> {
    let capture = |re: &regex::Regex| -> Option<f64> {
        re.captures(line)
            .and_then(|caps| caps[1].parse::<u64>().ok())
            .map(|v| v as f64)
    };

    let fields = NumericFields {
        package_count: capture(&LABELED_PACKAGES),
        gross_weight: capture(&LABELED_GROSS),
        net_weight: capture(&LABELED_NET),
    };

    if fields.is_empty() { None } else { Some(fields) }
}

fn positive_integers(line: &str) -> Vec<u64> {
    INTEGER
        .find_iter(line)
        .filter_map(|m| m.as_str().parse::<u64>().ok())
        .filter(|&n| n > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_row() {
        let extractor = LineExtractor::new();
        let m = extractor.extract("| Хурма свежая | 10 | 200 | 190 |").unwrap();

        assert_eq!(
            m.value,
            Product::new("Хурма свежая")
                .with_package_count(10.0)
                .with_gross_weight(200.0)
                .with_net_weight(190.0)
        );
        assert_eq!(m.confidence, 0.6);
    }

    #[test]
    fn test_plain_row_with_long_name() {
        let extractor = LineExtractor::new();
        let m = extractor
            .extract("Хурма свежая сорт Королёк 3670 23130 20190")
            .unwrap();

        assert_eq!(m.value.name, "Хурма свежая сорт Королёк");
        assert_eq!(m.value.package_count, Some(3670.0));
        assert_eq!(m.value.gross_weight, Some(23130.0));
        assert_eq!(m.value.net_weight, Some(20190.0));
    }

    #[test]
    fn test_labeled_values_win() {
        let extractor = LineExtractor::new();
        let m = extractor
            .extract("Яблоки мест: 5 брутто: 120 нетто: 100 партия 7")
            .unwrap();

        assert_eq!(m.value.name, "Яблоки");
        assert_eq!(m.value.package_count, Some(5.0));
        assert_eq!(m.value.gross_weight, Some(120.0));
        assert_eq!(m.value.net_weight, Some(100.0));
        assert_eq!(m.confidence, 0.9);
    }

    #[test]
    fn test_leading_ordinal_falls_back_to_longest_span() {
        let extractor = LineExtractor::new();
        let m = extractor.extract("| 1 | Виноград кишмиш | 40 | 400 | 380 |").unwrap();

        assert_eq!(m.value.name, "Виноград кишмиш");
        // The ordinal is the smallest number; known weakness of positional assignment.
        assert_eq!(m.value.package_count, Some(1.0));
        assert_eq!(m.value.gross_weight, Some(400.0));
        assert_eq!(m.value.net_weight, Some(380.0));
    }

    #[test]
    fn test_name_only() {
        let extractor = LineExtractor::new();
        let m = extractor.extract("Черешня свежая").unwrap();

        assert_eq!(m.value, Product::new("Черешня свежая"));
        assert_eq!(m.confidence, 0.2);
    }

    #[test]
    fn test_two_numbers() {
        let fields = TrailingWeights.assign(&[900, 30]);
        assert_eq!(fields.package_count, Some(30.0));
        assert_eq!(fields.gross_weight, Some(900.0));
        assert_eq!(fields.net_weight, None);
    }

    #[test]
    fn test_rejects_short_or_latin_names() {
        let extractor = LineExtractor::new();
        assert!(extractor.extract("Ки 10 20 30").is_none());
        assert!(extractor.extract("Apples 10 20 30").is_none());
        assert!(extractor.extract("   ").is_none());
    }

    #[test]
    fn test_custom_assignment() {
        struct LeadingCount;

        impl NumericAssignment for LeadingCount {
            fn assign(&self, numbers: &[u64]) -> NumericFields {
                NumericFields {
                    package_count: numbers.first().map(|&v| v as f64),
                    gross_weight: numbers.get(1).map(|&v| v as f64),
                    net_weight: numbers.get(2).map(|&v| v as f64),
                }
            }
        }

        let extractor = LineExtractor::new().with_assignment(LeadingCount);
        let m = extractor.extract("Дыня 500 40 30").unwrap();

        assert_eq!(m.value.package_count, Some(500.0));
        assert_eq!(m.value.gross_weight, Some(40.0));
        assert_eq!(m.value.net_weight, Some(30.0));
    }
}
