//! Raw payload shapes sent by the recommendation service over time.
//!
//! These types mirror the JSON exactly and are only ever consumed by the
//! normalizer, which maps each of them into [`super::RecommendationRecord`].

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// What came back from the service after transport-level checks passed
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceResponse {
    /// HTTP 204, a valid empty result set
    NoContent,
    /// Raw body of a successful response
    Body(Vec<u8>),
}

impl ServiceResponse {
    pub fn json(value: &Value) -> Self {
        ServiceResponse::Body(value.to_string().into_bytes())
    }
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorEnvelope {
    /// `message` wins over `error`; blank strings count as missing
    pub fn best_message(&self) -> Option<&str> {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}

// ============================================================================
// Perfume payload shapes
// ============================================================================

/// Which historical shape a `perfume` object uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireShape {
    /// `properties` with `perfume_type`/`core_notes` plus `shops`
    Current,
    /// `properties` with `type`/`middle_notes` plus a volume -> link map
    Glued,
    /// Everything directly under `perfume`, one `link`/`volume` pair
    Flat,
}

impl WireShape {
    pub fn detect(perfume: &Map<String, Value>) -> Self {
        if perfume.contains_key("shops") {
            return WireShape::Current;
        }
        match perfume.get("properties").and_then(Value::as_object) {
            Some(props) if props.contains_key("perfume_type") || props.contains_key("core_notes") => {
                WireShape::Current
            }
            Some(_) => WireShape::Glued,
            None => WireShape::Flat,
        }
    }
}

#[derive(Debug, Clone)]
pub enum WirePerfume {
    Current(CurrentPerfume),
    Glued(GluedPerfume),
    Flat(FlatPerfume),
}

impl WirePerfume {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let shape = match &value {
            Value::Object(map) => WireShape::detect(map),
            // Let serde produce the type error
            _ => WireShape::Flat,
        };
        Ok(match shape {
            WireShape::Current => WirePerfume::Current(serde_json::from_value(value)?),
            WireShape::Glued => WirePerfume::Glued(serde_json::from_value(value)?),
            WireShape::Flat => WirePerfume::Flat(serde_json::from_value(value)?),
        })
    }

    pub fn shape(&self) -> WireShape {
        match self {
            WirePerfume::Current(_) => WireShape::Current,
            WirePerfume::Glued(_) => WireShape::Glued,
            WirePerfume::Flat(_) => WireShape::Flat,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentPerfume {
    pub brand: String,
    pub name: String,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub properties: Option<CurrentProperties>,
    #[serde(default)]
    pub shops: Option<Vec<WireShop>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentProperties {
    #[serde(default)]
    pub perfume_type: Option<String>,
    #[serde(default)]
    pub family: Option<Vec<String>>,
    #[serde(default)]
    pub upper_notes: Option<Vec<String>>,
    #[serde(default)]
    pub core_notes: Option<Vec<String>>,
    #[serde(default)]
    pub base_notes: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<WireTags>,
    #[serde(default)]
    pub upper_characteristics: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub core_characteristics: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub base_characteristics: Option<BTreeMap<String, f64>>,
}

/// Tags arrive either weighted (`{"fresh": 3}`) or as a plain list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireTags {
    Weighted(BTreeMap<String, f64>),
    Listed(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireShop {
    pub shop_name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub variants: Option<Vec<WireVariant>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireVariant {
    pub volume: f64,
    #[serde(default)]
    pub price: Option<f64>,
    pub link: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GluedPerfume {
    pub brand: String,
    pub name: String,
    #[serde(default)]
    pub properties: GluedProperties,
    /// Volume (as a string key) to shop link
    #[serde(default)]
    pub links: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GluedProperties {
    #[serde(default, rename = "type")]
    pub perfume_type: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub family: Option<Vec<String>>,
    #[serde(default)]
    pub upper_notes: Option<Vec<String>>,
    #[serde(default)]
    pub middle_notes: Option<Vec<String>>,
    #[serde(default)]
    pub base_notes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlatPerfume {
    pub brand: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub perfume_type: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub family: Option<Vec<String>>,
    #[serde(default)]
    pub upper_notes: Option<Vec<String>>,
    #[serde(default)]
    pub middle_notes: Option<Vec<String>>,
    #[serde(default)]
    pub base_notes: Option<Vec<String>>,
    #[serde(default)]
    pub link: Option<String>,
    /// Always emitted by the service, zero when unknown
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}
