use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type Id = String;

/// Document field holding the unique identifier
pub const ID_FIELD: &str = "_id";
/// Document and descriptor field holding the type tag
pub const TYPE_FIELD: &str = "_type";
/// Type tag value identifying a reference descriptor
pub const REFERENCE_TYPE: &str = "reference";
/// Descriptor field holding the target document id
pub const REF_FIELD: &str = "_ref";
/// Descriptor field marking a reference as weak
pub const WEAK_FIELD: &str = "_weak";

/// Direction of a conversion run. Selects both the scan predicate and the patch shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionMode {
    #[default]
    StrongToWeak,
    WeakToStrong,
}

impl ConversionMode {
    /// Kind of reference this mode looks for
    pub fn source_kind(&self) -> ReferenceKind {
        match self {
            ConversionMode::StrongToWeak => ReferenceKind::Strong,
            ConversionMode::WeakToStrong => ReferenceKind::Weak,
        }
    }

    /// Kind of reference this mode produces
    pub fn target_kind(&self) -> ReferenceKind {
        match self {
            ConversionMode::StrongToWeak => ReferenceKind::Weak,
            ConversionMode::WeakToStrong => ReferenceKind::Strong,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionMode::StrongToWeak => "strong-to-weak",
            ConversionMode::WeakToStrong => "weak-to-strong",
        }
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "strong-to-weak" => Ok(ConversionMode::StrongToWeak),
            "weak-to-strong" => Ok(ConversionMode::WeakToStrong),
            other => Err(anyhow::anyhow!("Unknown conversion mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Strong,
    Weak,
}
