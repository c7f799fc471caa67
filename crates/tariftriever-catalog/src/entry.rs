use serde::{Deserialize, Serialize};

/// Code lengths used by the tariff nomenclature: heading, subheading,
/// and the two national subdivisions.
const VALID_CODE_LENGTHS: [usize; 4] = [4, 6, 8, 10];

/// One catalog record. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    pub description: String,
    /// Precomputed description embedding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl CatalogEntry {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            embedding: None,
        }
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// True for all-digit codes of 4, 6, 8 or 10 digits
pub fn is_valid_code(code: &str) -> bool {
    VALID_CODE_LENGTHS.contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_codes() {
        assert!(is_valid_code("0206"));
        assert!(is_valid_code("020610"));
        assert!(is_valid_code("02061000"));
        assert!(is_valid_code("0206100000"));
    }

    #[test]
    fn test_invalid_codes() {
        assert!(!is_valid_code("020"));
        assert!(!is_valid_code("02061"));
        assert!(!is_valid_code("02a6"));
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("02061000001"));
    }

    #[test]
    fn test_embedding_is_optional_in_json() {
        let entry: CatalogEntry =
            serde_json::from_str(r#"{"code":"0206","description":"offal"}"#).unwrap();
        assert_eq!(entry.embedding, None);
    }
}
