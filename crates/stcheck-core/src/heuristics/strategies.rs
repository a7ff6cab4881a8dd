//! Line-scanning strategies for recovering product rows.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::ExtractionMatch;
use super::line::LineExtractor;
use super::patterns::{
    BOILERPLATE_KEYWORDS, COLUMN_KEYWORDS, NAME_RUN_3, NAME_RUN_4, TABLE_FOOTER, TABLE_HEADER,
};
use crate::models::{HeuristicsConfig, Product};

const STANDALONE_MIN_CHARS: usize = 10;
const AGGRESSIVE_MIN_CHARS: usize = 5;

/// Scanning strategy.
///
/// [`ProductScanner::scan`] tries the first three in order.
/// `LastResort` only runs from [`ProductScanner::scan_with_last_resort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Rows following a table header.
    TableHeader,
    /// Any line that looks like a named product.
    Standalone,
    /// Short fragments split on newlines and semicolons.
    Aggressive,
    /// Any line with a Cyrillic word and a digit, no keyword filter.
    LastResort,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::TableHeader,
        Strategy::Standalone,
        Strategy::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::TableHeader => "table_header",
            Strategy::Standalone => "standalone",
            Strategy::Aggressive => "aggressive",
            Strategy::LastResort => "last_resort",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs the strategies over normalized text.
#[derive(Debug, Clone)]
pub struct ProductScanner {
    header_window: usize,
    aggressive_cap: usize,
    line_extractor: LineExtractor,
}

impl ProductScanner {
    pub fn new() -> Self {
        Self::from_config(&HeuristicsConfig::default())
    }

    pub fn from_config(config: &HeuristicsConfig) -> Self {
        Self {
            header_window: config.header_window,
            aggressive_cap: config.aggressive_cap,
            line_extractor: LineExtractor::new(),
        }
    }

    pub fn with_line_extractor(mut self, extractor: LineExtractor) -> Self {
        self.line_extractor = extractor;
        self
    }

    /// Run strategies in order. Returns the first non-empty result together
    /// with the strategy that produced it.
    pub fn scan(&self, normalized: &str) -> Option<(Strategy, Vec<ExtractionMatch<Product>>)> {
        let lines: Vec<&str> = normalized.lines().collect();

        for strategy in Strategy::ALL {
            let matches = self.run(strategy, normalized, &lines);
            debug!("Strategy {} found {} products", strategy, matches.len());
            if !matches.is_empty() {
                return Some((strategy, matches));
            }
        }

        None
    }

    /// [`scan`](Self::scan), then the unfiltered last-resort pass when every
    /// regular strategy came up empty.
    pub fn scan_with_last_resort(
        &self,
        normalized: &str,
    ) -> Option<(Strategy, Vec<ExtractionMatch<Product>>)> {
        if let Some(found) = self.scan(normalized) {
            return Some(found);
        }

        let matches = self.run_strategy(Strategy::LastResort, normalized);
        debug!("Strategy {} found {} products", Strategy::LastResort, matches.len());
        if matches.is_empty() { None } else { Some((Strategy::LastResort, matches)) }
    }

    /// Run a single strategy.
    pub fn run_strategy(&self, strategy: Strategy, normalized: &str) -> Vec<ExtractionMatch<Product>> {
        let lines: Vec<&str> = normalized.lines().collect();
        self.run(strategy, normalized, &lines)
    }

    fn run(&self, strategy: Strategy, normalized: &str, lines: &[&str]) -> Vec<ExtractionMatch<Product>> {
        match strategy {
            Strategy::TableHeader => self.table_rows(lines),
            Strategy::Standalone => self.standalone_lines(lines),
            Strategy::Aggressive => self.fragments(normalized),
            Strategy::LastResort => self.any_lines(lines),
        }
    }

    fn table_rows(&self, lines: &[&str]) -> Vec<ExtractionMatch<Product>> {
        let Some(header) = lines.iter().position(|line| TABLE_HEADER.is_match(line)) else {
            return Vec::new();
        };

        let mut matches = Vec::new();
        for line in lines.iter().skip(header + 1).take(self.header_window) {
            if TABLE_FOOTER.is_match(line) {
                break;
            }
            if !NAME_RUN_3.is_match(line) {
                continue;
            }
            if let Some(m) = self.line_extractor.extract(line) {
                matches.push(m);
            }
        }
        matches
    }

    fn standalone_lines(&self, lines: &[&str]) -> Vec<ExtractionMatch<Product>> {
        lines
            .iter()
            .filter(|line| line.chars().count() >= STANDALONE_MIN_CHARS)
            .filter(|line| NAME_RUN_3.is_match(line))
            .filter(|line| !COLUMN_KEYWORDS.is_match(line))
            .filter_map(|line| self.line_extractor.extract(line))
            .collect()
    }

    fn fragments(&self, normalized: &str) -> Vec<ExtractionMatch<Product>> {
        normalized
            .split(['\n', ';'])
            .map(str::trim)
            .filter(|part| part.chars().count() >= AGGRESSIVE_MIN_CHARS)
            .filter(|part| NAME_RUN_4.is_match(part))
            .filter(|part| part.chars().any(|c| c.is_ascii_digit()))
            .filter(|part| !BOILERPLATE_KEYWORDS.is_match(part))
            .filter_map(|part| self.line_extractor.extract(part))
            .take(self.aggressive_cap)
            .collect()
    }

    // The cap applies to candidate lines, before extraction.
    fn any_lines(&self, lines: &[&str]) -> Vec<ExtractionMatch<Product>> {
        lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| line.chars().count() >= AGGRESSIVE_MIN_CHARS)
            .filter(|line| NAME_RUN_4.is_match(line))
            .filter(|line| line.chars().any(|c| c.is_ascii_digit()))
            .take(self.aggressive_cap)
            .filter_map(|line| self.line_extractor.extract(line))
            .collect()
    }
}

impl Default for ProductScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(matches: &[ExtractionMatch<Product>]) -> Vec<&str> {
        matches.iter().map(|m| m.value.name.as_str()).collect()
    }

    #[test]
    fn test_table_stops_at_footer() {
        let text = "Наименование товара | Мест | Брутто | Нетто\n\
                    Хурма свежая | 10 | 200 | 190\n\
                    Гранат свежий | 5 | 100 | 95\n\
                    Итого | 15 | 300 | 285\n\
                    Подпись продавца";
        let scanner = ProductScanner::new();
        let (strategy, matches) = scanner.scan(text).unwrap();

        assert_eq!(strategy, Strategy::TableHeader);
        assert_eq!(names(&matches), vec!["Хурма свежая", "Гранат свежий"]);
    }

    #[test]
    fn test_table_window_is_bounded() {
        let config = HeuristicsConfig {
            header_window: 1,
            aggressive_cap: 10,
        };
        let text = "Товар\nХурма 1 2 3\nГранат 4 5 6";
        let matches = ProductScanner::from_config(&config).run_strategy(Strategy::TableHeader, text);

        assert_eq!(names(&matches), vec!["Хурма"]);
    }

    #[test]
    fn test_standalone_skips_captions() {
        let text = "Поставка по договору\n\
                    Место погрузки: Ташкент 100\n\
                    Вес брутто 400\n\
                    Виноград кишмиш 40 400 380";
        let matches = ProductScanner::new().run_strategy(Strategy::Standalone, text);

        assert_eq!(names(&matches), vec!["Поставка по договору", "Виноград кишмиш"]);
        assert!(!matches[0].value.has_numbers());
    }

    #[test]
    fn test_standalone_keeps_labeled_package_rows() {
        let text = "Поставка фруктов\nПерсики свежие мест: 12 вес 300";
        let matches = ProductScanner::new().run_strategy(Strategy::Standalone, text);

        assert_eq!(names(&matches), vec!["Поставка фруктов", "Персики свежие"]);
        assert_eq!(matches[1].value.package_count, Some(12.0));
        assert_eq!(matches[1].confidence, 0.9);
    }

    #[test]
    fn test_aggressive_splits_and_caps() {
        let config = HeuristicsConfig {
            header_window: 20,
            aggressive_cap: 2,
        };
        let text = "Лук 10 100 90; Морковь 20 200 180; Капуста 30 300 270";
        let matches = ProductScanner::from_config(&config).run_strategy(Strategy::Aggressive, text);

        // "Лук" has only three letters.
        assert_eq!(names(&matches), vec!["Морковь", "Капуста"]);
    }

    #[test]
    fn test_aggressive_skips_invoice_boilerplate() {
        let text = "Счёт-фактура 15 от 01.02.2024;Дыни 12 600 580";
        let matches = ProductScanner::new().run_strategy(Strategy::Aggressive, text);

        assert_eq!(names(&matches), vec!["Дыни"]);
    }

    #[test]
    fn test_aggressive_keeps_labeled_package_rows() {
        let text = "Счёт-фактура 15;Дыни 12 мест";
        let matches = ProductScanner::new().run_strategy(Strategy::Aggressive, text);

        assert_eq!(names(&matches), vec!["Дыни"]);
        assert_eq!(matches[0].value.package_count, Some(12.0));
    }

    #[test]
    fn test_last_resort_ignores_keywords() {
        let text = "Итого 15 300 285\nТовар отгружен 20 400 380";
        let scanner = ProductScanner::new();

        assert!(scanner.scan(text).is_none());

        let (strategy, matches) = scanner.scan_with_last_resort(text).unwrap();
        assert_eq!(strategy, Strategy::LastResort);
        assert_eq!(names(&matches), vec!["Итого", "Товар отгружен"]);
        assert_eq!(
            matches[1].value,
            Product::new("Товар отгружен")
                .with_package_count(20.0)
                .with_gross_weight(400.0)
                .with_net_weight(380.0)
        );
    }

    #[test]
    fn test_last_resort_caps_candidate_lines() {
        let config = HeuristicsConfig {
            header_window: 20,
            aggressive_cap: 2,
        };
        let text = "Итого 1 2 3\nВсего 4 5 6\nНетто 7 8 9";
        let matches = ProductScanner::from_config(&config).run_strategy(Strategy::LastResort, text);

        assert_eq!(names(&matches), vec!["Итого", "Всего"]);
    }

    #[test]
    fn test_regular_result_wins_over_last_resort() {
        let text = "Итого 1 2 3\nВиноград кишмиш 40 400 380";
        let (strategy, _) = ProductScanner::new().scan_with_last_resort(text).unwrap();
        assert_eq!(strategy, Strategy::Standalone);
    }

    #[test]
    fn test_nothing_found() {
        assert!(ProductScanner::new().scan("12345\nABC 1 2 3").is_none());
    }
}
