//! Company-name extraction for party matching.
//!
//! Documents write parties as free text: legal form, quoted name, full
//! address. Matching compares only the bare company name, and how to find it
//! depends on the language the documents are written in.

use super::compare::normalize_for_compare;

/// Reduces a party string to a comparable company name.
pub trait CompanyNameNormalizer: Send + Sync {
    /// Locale tag this normalizer understands, e.g. `ru`.
    fn locale(&self) -> &str;

    /// Comparable company name. Equal output means same company.
    fn company_name(&self, raw: &str) -> String;
}

/// Keyword-driven normalizer.
///
/// A quoted substring wins. Otherwise the text is cut at the earliest address
/// keyword and a leading legal-form prefix is removed.
#[derive(Debug, Clone)]
pub struct KeywordCompanyNormalizer {
    locale: String,
    address_keywords: Vec<String>,
    legal_prefixes: Vec<String>,
}

impl KeywordCompanyNormalizer {
    pub fn new(
        locale: impl Into<String>,
        address_keywords: impl IntoIterator<Item = impl Into<String>>,
        legal_prefixes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            locale: locale.into(),
            address_keywords: address_keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
            legal_prefixes: legal_prefixes
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .collect(),
        }
    }

    /// Russian-language documents from Uzbekistan and Russia.
    pub fn russian() -> Self {
        Self::new(
            "ru",
            [
                "республика",
                "узбекистан",
                "область",
                "район",
                "город",
                "г.",
                "улица",
                "ул",
                "дом",
                "д.",
                "стр",
                "кв",
                "индекс",
                "российская федерация",
            ],
            // Latin "ooo" shows up in OCR'd and transliterated text.
            ["сп", "ooo", "ооо", "ип", "чп"],
        )
    }

    /// Built-in normalizer for `locale`, if there is one.
    pub fn for_locale(locale: &str) -> Option<Self> {
        match locale.to_lowercase().as_str() {
            "ru" | "ru-ru" | "ru-uz" => Some(Self::russian()),
            _ => None,
        }
    }

    /// Byte offset of the earliest address keyword that starts a word.
    fn address_start(&self, text: &str) -> Option<usize> {
        self.address_keywords
            .iter()
            .filter_map(|keyword| find_word_start(text, keyword))
            .min()
    }

    fn strip_legal_prefix<'a>(&self, mut name: &'a str) -> &'a str {
        for prefix in &self.legal_prefixes {
            if let Some(rest) = name.strip_prefix(prefix.as_str()) {
                if rest.starts_with(char::is_whitespace) {
                    name = rest.trim_start();
                }
            }
        }
        name
    }
}

impl Default for KeywordCompanyNormalizer {
    fn default() -> Self {
        Self::russian()
    }
}

impl CompanyNameNormalizer for KeywordCompanyNormalizer {
    fn locale(&self) -> &str {
        &self.locale
    }

    fn company_name(&self, raw: &str) -> String {
        if let Some(quoted) = quoted_name(raw) {
            return normalize_for_compare(quoted);
        }

        let text = normalize_for_compare(raw);
        let cut = self.address_start(&text).unwrap_or(text.len());
        let name = text[..cut].trim();

        self.strip_legal_prefix(name).trim().to_string()
    }
}

/// First non-empty text inside straight or guillemet quotes.
fn quoted_name(raw: &str) -> Option<&str> {
    [('"', '"'), ('«', '»')].into_iter().find_map(|(open, close)| {
        let start = raw.find(open)? + open.len_utf8();
        let len = raw[start..].find(close)?;
        let inner = &raw[start..start + len];
        if inner.trim().is_empty() { None } else { Some(inner) }
    })
}

fn find_word_start(text: &str, keyword: &str) -> Option<usize> {
    text.match_indices(keyword)
        .map(|(idx, _)| idx)
        .find(|&idx| {
            text[..idx]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quoted_name_wins() {
        let n = KeywordCompanyNormalizer::russian();
        assert_eq!(
            n.company_name("СП ООО \"Agro Fruit Export\" Республика Узбекистан, г. Ташкент"),
            "agro fruit export"
        );
        assert_eq!(n.company_name("ООО «Фрукты Востока»"), "фрукты востока");
    }

    #[test]
    fn test_address_is_cut_and_prefix_stripped() {
        let n = KeywordCompanyNormalizer::russian();
        assert_eq!(
            n.company_name("СП Samarkand Agro Республика Узбекистан, Самаркандская область"),
            "samarkand agro"
        );
        assert_eq!(n.company_name("ООО Восток г. Москва, ул. Ленина, д. 5"), "восток");
        assert_eq!(n.company_name("ooo Delta Trade"), "delta trade");
    }

    #[test]
    fn test_keywords_only_match_at_word_start() {
        let n = KeywordCompanyNormalizer::russian();
        // "ул" inside "Гулистан" is not a street marker.
        assert_eq!(n.company_name("ООО Гулистан Фрут"), "гулистан фрут");
    }

    #[test]
    fn test_prefix_needs_a_following_word() {
        let n = KeywordCompanyNormalizer::russian();
        assert_eq!(n.company_name("Спектр"), "спектр");
    }

    #[test]
    fn test_for_locale() {
        assert_eq!(KeywordCompanyNormalizer::for_locale("RU").unwrap().locale(), "ru");
        assert!(KeywordCompanyNormalizer::for_locale("de").is_none());
    }
}
