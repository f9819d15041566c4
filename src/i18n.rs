use std::fmt;

/// Languages written right to left. Grid labels and the street index flip
/// their horizontal order for these.
const RTL_LANGUAGES: &[&str] = &["ar", "dv", "fa", "he", "ps", "ur", "yi"];

/// A POSIX-style locale tag, such as `fr_FR.UTF-8`.
///
/// Parsing never fails: unrecognizable tags (including `C` and `POSIX`)
/// degrade to English.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    language: String,
    territory: Option<String>,
}

impl Locale {
    pub fn parse(tag: &str) -> Self {
        // Strip the optional codeset and modifier: "fr_FR.UTF-8@euro" -> "fr_FR".
        let base = tag.split(['.', '@']).next().unwrap_or("");
        let base = base.trim().replace('-', "_");

        if base.is_empty() || base == "C" || base == "POSIX" {
            return Locale {
                language: "en".to_string(),
                territory: None,
            };
        }

        let mut parts = base.split('_');
        let language = parts
            .next()
            .map(str::to_ascii_lowercase)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "en".to_string());
        let territory = parts
            .next()
            .map(str::to_ascii_uppercase)
            .filter(|s| !s.is_empty());

        Locale {
            language,
            territory,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// The locale code, `language_TERRITORY` when a territory is known.
    pub fn code(&self) -> String {
        match &self.territory {
            Some(territory) => format!("{}_{}", self.language, territory),
            None => self.language.clone(),
        }
    }

    pub fn is_rtl(&self) -> bool {
        RTL_LANGUAGES.contains(&self.language.as_str())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_posix_tag() {
        let locale = Locale::parse("fr_FR.UTF-8");
        assert_eq!(locale.language(), "fr");
        assert_eq!(locale.code(), "fr_FR");
        assert!(!locale.is_rtl());
    }

    #[test]
    fn test_parse_bare_language() {
        let locale = Locale::parse("de");
        assert_eq!(locale.code(), "de");
    }

    #[test]
    fn test_parse_hyphenated_tag() {
        assert_eq!(Locale::parse("pt-BR").code(), "pt_BR");
    }

    #[test]
    fn test_c_locale_falls_back_to_english() {
        assert_eq!(Locale::parse("C").code(), "en");
        assert_eq!(Locale::parse("").code(), "en");
    }

    #[test]
    fn test_rtl_detection() {
        assert!(Locale::parse("ar_MA.UTF-8").is_rtl());
        assert!(Locale::parse("he_IL").is_rtl());
        assert!(!Locale::parse("en_US").is_rtl());
    }
}
