//! Model catalog types and per-variant card profiles

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Model type namespace understood by the serving API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Embedding,
    Rerank,
}

impl ModelKind {
    /// Wire literal used in request bodies and URL paths
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Embedding => "embedding",
            ModelKind::Rerank => "rerank",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric stat a card shows on its description panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    Dimensions,
    MaxTokens,
}

impl StatField {
    pub fn label(&self) -> &'static str {
        match self {
            StatField::Dimensions => "dimensions",
            StatField::MaxTokens => "max tokens",
        }
    }
}

/// Per-variant card configuration
///
/// One parameterized card covers every model type; the profile selects the
/// wire literal, the stats shown on the description panel, and whether the
/// variant offers deletion of custom registrations.
#[derive(Debug, Clone, Copy)]
pub struct CardProfile {
    pub kind: ModelKind,
    pub stat_fields: &'static [StatField],
    pub supports_custom_delete: bool,
}

impl CardProfile {
    pub const fn embedding() -> Self {
        Self {
            kind: ModelKind::Embedding,
            stat_fields: &[StatField::Dimensions, StatField::MaxTokens],
            supports_custom_delete: true,
        }
    }

    pub const fn rerank() -> Self {
        Self {
            kind: ModelKind::Rerank,
            stat_fields: &[],
            supports_custom_delete: false,
        }
    }

    pub const fn for_kind(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Embedding => Self::embedding(),
            ModelKind::Rerank => Self::rerank(),
        }
    }
}

/// Read-only description of a launchable model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub model_name: String,

    /// Language tags, in catalog order
    #[serde(default)]
    pub language: Vec<String>,

    #[serde(default)]
    pub is_cached: bool,

    /// Embedding dimensionality; absent for rerank models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ModelDescriptor {
    /// Look up the value backing a stat field
    pub fn stat(&self, field: StatField) -> Option<u32> {
        match field {
            StatField::Dimensions => self.dimensions,
            StatField::MaxTokens => self.max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_literals() {
        assert_eq!(ModelKind::Embedding.as_str(), "embedding");
        assert_eq!(ModelKind::Rerank.as_str(), "rerank");
        assert_eq!(
            serde_json::to_value(ModelKind::Embedding).unwrap(),
            serde_json::json!("embedding")
        );
    }

    #[test]
    fn test_profile_selection() {
        let embedding = CardProfile::for_kind(ModelKind::Embedding);
        assert!(embedding.supports_custom_delete);
        assert_eq!(
            embedding.stat_fields,
            &[StatField::Dimensions, StatField::MaxTokens]
        );

        let rerank = CardProfile::for_kind(ModelKind::Rerank);
        assert!(!rerank.supports_custom_delete);
        assert!(rerank.stat_fields.is_empty());
    }

    #[test]
    fn test_descriptor_defaults_from_sparse_catalog_entry() {
        let descriptor: ModelDescriptor =
            serde_json::from_str(r#"{"model_name": "bge-reranker-base"}"#).unwrap();
        assert_eq!(descriptor.model_name, "bge-reranker-base");
        assert!(descriptor.language.is_empty());
        assert!(!descriptor.is_cached);
        assert!(descriptor.dimensions.is_none());
        assert!(descriptor.max_tokens.is_none());
    }

    #[test]
    fn test_descriptor_stat_lookup() {
        let descriptor = ModelDescriptor {
            model_name: "bge-small-en".to_string(),
            language: vec!["en".to_string()],
            is_cached: true,
            dimensions: Some(384),
            max_tokens: Some(512),
        };
        assert_eq!(descriptor.stat(StatField::Dimensions), Some(384));
        assert_eq!(descriptor.stat(StatField::MaxTokens), Some(512));
    }
}
