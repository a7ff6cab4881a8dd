//! Regex patterns for recovering product rows from Cyrillic document text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Name-script runs
    pub static ref NAME_RUN_3: Regex = Regex::new(r"[А-ЯЁа-яё]{3,}").unwrap();

    pub static ref NAME_RUN_4: Regex = Regex::new(r"[А-ЯЁа-яё]{4,}").unwrap();

    pub static ref NAME_SPAN: Regex = Regex::new(r"[А-ЯЁа-яё][А-ЯЁа-яё\s\-.]{2,}").unwrap();

    pub static ref NAME_LETTER: Regex = Regex::new(r"[А-ЯЁа-яё]").unwrap();

    // Table structure
    pub static ref TABLE_HEADER: Regex = Regex::new(
        r"(?i)наименование\s+товара|товар|наименование"
    ).unwrap();

    pub static ref TABLE_FOOTER: Regex = Regex::new(
        r"(?i)итого|всего|сумма|total"
    ).unwrap();

    // Column captions and totals; a line carrying one is not a product row
    pub static ref COLUMN_KEYWORDS: Regex = Regex::new(
        r"(?i)наименование|товар|место|брутто|нетто|итого|всего"
    ).unwrap();

    pub static ref BOILERPLATE_KEYWORDS: Regex = Regex::new(
        r"(?i)наименование|товар|место|брутто|нетто|итого|всего|сч[её]т|фактур"
    ).unwrap();

    // Labeled numbers
    pub static ref LABELED_PACKAGES: Regex = Regex::new(r"(?i)мест[:\s]+(\d+)").unwrap();

    pub static ref LABELED_GROSS: Regex = Regex::new(r"(?i)брутто[:\s]+(\d+)").unwrap();

    pub static ref LABELED_NET: Regex = Regex::new(r"(?i)нетто[:\s]+(\d+)").unwrap();

    pub static ref INTEGER: Regex = Regex::new(r"\d+").unwrap();

    // Name cleanup
    pub static ref NAME_LEADING_NOISE: Regex = Regex::new(r"^[\s|│\d]+").unwrap();

    pub static ref NAME_TRAILING_NOISE: Regex = Regex::new(r"[\s|│:,;]+$").unwrap();

    pub static ref NAME_TRAILING_LABEL: Regex = Regex::new(
        r"(?i)[\s|│:,;]*(мест|брутто|нетто)[\s|│:,;]*$"
    ).unwrap();
}
