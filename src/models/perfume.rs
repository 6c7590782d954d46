use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A single ranked recommendation in the stable internal shape
///
/// Built fresh by the normalizer for every response, whatever wire shape the
/// service used. `None` always means the service did not send the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    /// Position in the ranking, also used as the list key
    pub rank: u32,
    pub brand: String,
    pub name: String,
    pub gender_affinity: Option<String>,
    pub image_url: Option<String>,
    pub properties: Properties,
    pub shops: Vec<Shop>,
    pub similarity_score: Option<SimilarityScore>,
}

impl RecommendationRecord {
    /// `brand name` as shown in result lists
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub perfume_type: Option<String>,
    /// Olfactory families in the order the service sent them
    pub family: Option<Vec<String>>,
    pub upper_notes: Vec<String>,
    pub core_notes: Vec<String>,
    pub base_notes: Vec<String>,
    pub tags: Option<BTreeSet<String>>,
    pub characteristics: Characteristics,
}

impl Properties {
    /// Families with duplicates dropped, first occurrence kept
    pub fn family_groups(&self) -> Option<Vec<&str>> {
        self.family.as_ref().map(|family| first_seen(family))
    }

    pub fn tag_groups(&self) -> Option<Vec<&str>> {
        self.tags
            .as_ref()
            .map(|tags| tags.iter().map(String::as_str).collect())
    }
}

fn first_seen(values: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(String::as_str)
        .filter(|v| seen.insert(*v))
        .collect()
}

/// Named numeric intensities per note layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Characteristics {
    pub upper: Option<BTreeMap<String, f64>>,
    pub core: Option<BTreeMap<String, f64>>,
    pub base: Option<BTreeMap<String, f64>>,
}

impl Characteristics {
    pub fn is_empty(&self) -> bool {
        self.upper.is_none() && self.core.is_none() && self.base.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub shop_name: String,
    /// `None` when neither the service nor any variant link names a host
    pub domain: Option<String>,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub volume: f64,
    /// Older service shapes only carry links, never prices
    pub price: Option<f64>,
    pub link: String,
}

/// Similarity as sent by the service, either a fraction or a percentage
///
/// The raw value is kept untouched; the scale is decided every time it is read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimilarityScore(pub f64);

impl SimilarityScore {
    pub fn raw(&self) -> f64 {
        self.0
    }

    /// Values above 1 are already percentages, anything else is a fraction
    pub fn percent(&self) -> f64 {
        if self.0 > 1.0 {
            self.0
        } else {
            self.0 * 100.0
        }
    }

    pub fn rounded_percent(&self) -> u32 {
        self.percent().round().max(0.0) as u32
    }

    /// Zero or negative scores are not worth showing
    pub fn is_displayable(&self) -> bool {
        self.0 > 0.0
    }
}
