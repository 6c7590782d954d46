use serde::{Deserialize, Serialize};

use super::GenderAffinity;

/// A request for recommendations, either seeded by a known perfume or by tags
///
/// Optional fields left as `None` are omitted from the outgoing query so the
/// service applies its own default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecommendationRequest {
    ByName {
        brand: String,
        name: String,
        use_ai: Option<bool>,
        gender_affinity: Option<GenderAffinity>,
    },
    ByTags {
        tags: Vec<String>,
        gender_affinity: Option<GenderAffinity>,
    },
}

impl RecommendationRequest {
    pub fn by_name(brand: impl Into<String>, name: impl Into<String>) -> Self {
        RecommendationRequest::ByName {
            brand: brand.into(),
            name: name.into(),
            use_ai: None,
            gender_affinity: None,
        }
    }

    pub fn by_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RecommendationRequest::ByTags {
            tags: tags.into_iter().map(Into::into).collect(),
            gender_affinity: None,
        }
    }

    pub fn with_use_ai(mut self, value: bool) -> Self {
        if let RecommendationRequest::ByName { use_ai, .. } = &mut self {
            *use_ai = Some(value);
        }
        self
    }

    pub fn with_gender_affinity(mut self, value: GenderAffinity) -> Self {
        match &mut self {
            RecommendationRequest::ByName {
                gender_affinity, ..
            }
            | RecommendationRequest::ByTags {
                gender_affinity, ..
            } => *gender_affinity = Some(value),
        }
        self
    }

    pub fn gender_affinity(&self) -> Option<GenderAffinity> {
        match self {
            RecommendationRequest::ByName {
                gender_affinity, ..
            }
            | RecommendationRequest::ByTags {
                gender_affinity, ..
            } => *gender_affinity,
        }
    }

    /// Which independent flow this request belongs to
    pub fn flow(&self) -> FlowKind {
        match self {
            RecommendationRequest::ByName { .. } => FlowKind::ByName,
            RecommendationRequest::ByTags { .. } => FlowKind::ByTags,
        }
    }
}

/// The two recommendation flows, each with its own lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    ByName,
    ByTags,
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowKind::ByName => write!(f, "by_name"),
            FlowKind::ByTags => write!(f, "by_tags"),
        }
    }
}
