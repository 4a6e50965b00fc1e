use std::fmt::{self, Display};
use std::str::FromStr;

/// The unit being tagged: a gene, marker, region or study.
///
/// Each kind carries its own rule registry in the engine crate; dispatch
/// is an explicit match on this enum, never name synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Gene,
    Marker,
    Region,
    Study,
}

impl FeatureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKind::Gene => "gene",
            FeatureKind::Marker => "marker",
            FeatureKind::Region => "region",
            FeatureKind::Study => "study",
        }
    }
}

impl FromStr for FeatureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gene" => Ok(FeatureKind::Gene),
            "marker" => Ok(FeatureKind::Marker),
            "region" => Ok(FeatureKind::Region),
            "study" => Ok(FeatureKind::Study),
            _ => Err(format!("unsupported feature type: {s}")),
        }
    }
}

impl Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
