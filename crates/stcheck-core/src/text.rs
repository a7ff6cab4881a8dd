//! Whitespace normalization shared by both pipeline stages.

/// Collapse whitespace noise in extracted document text.
///
/// Within a line, runs of whitespace become a single space and the line is
/// trimmed. Blank lines are dropped, so runs of newlines become one newline.
/// `\r\n` and bare `\r` count as line breaks.
pub fn normalize_text(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(collapse_spaces)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse all whitespace runs in `s` to single spaces and trim.
pub fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_spaces_and_newlines() {
        let raw = "  Счет   фактура \t№ 12\r\n\r\n\n   Хурма  свежая   10  \n\n";
        assert_eq!(normalize_text(raw), "Счет фактура № 12\nХурма свежая 10");
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \n\t\n "), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "a  b\n\n c",
            "\u{a0}Наименование\u{a0}\u{a0}товара\n| 1 | 2 |",
            "line\r\rnext",
            "",
        ];
        for sample in samples {
            let once = normalize_text(sample);
            assert_eq!(normalize_text(&once), once);
        }
    }
}
