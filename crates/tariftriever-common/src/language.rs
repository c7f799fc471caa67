use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language a query was written in.
///
/// Serialized as its lowercase ISO 639 code. Other well-formed codes are kept
/// as-is so miss statistics can still group them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    #[default]
    Ru,
    Uz,
    En,
    Other(String),
}

/// A language tag that is not a 2-3 letter ISO 639 code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid language code '{code}': expected 2-3 ASCII letters")]
pub struct InvalidLanguage {
    pub code: String,
}

impl Language {
    pub fn code(&self) -> &str {
        match self {
            Self::Ru => "ru",
            Self::Uz => "uz",
            Self::En => "en",
            Self::Other(code) => code,
        }
    }
}

fn is_iso_code(code: &str) -> bool {
    (2..=3).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_lowercase())
}

impl TryFrom<&str> for Language {
    type Error = InvalidLanguage;

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        let code = code.trim().to_ascii_lowercase();
        match code.as_str() {
            "ru" => Ok(Self::Ru),
            "uz" => Ok(Self::Uz),
            "en" => Ok(Self::En),
            other if is_iso_code(other) => Ok(Self::Other(other.to_string())),
            _ => Err(InvalidLanguage { code }),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = InvalidLanguage;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::try_from(code.as_str())
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.code().to_string()
    }
}

impl std::str::FromStr for Language {
    type Err = InvalidLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
