use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

use crate::{
    error::{RecommendError, RecommendResult},
    models::{
        wire::{CurrentPerfume, FlatPerfume, GluedPerfume, WirePerfume, WireShop, WireTags},
        Characteristics, Properties, RecommendationRecord, ServiceResponse, Shop,
        SimilarityScore, Variant,
    },
};

/// Shop name for legacy links whose host cannot be recovered
pub const UNKNOWN_SHOP_NAME: &str = "Other retailers";

/// Caller-supplied knobs for normalization
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Used when a perfume comes without an image; `None` leaves it absent
    pub placeholder_image: Option<String>,
}

impl NormalizeOptions {
    pub fn with_placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder_image: Some(placeholder.into()),
        }
    }
}

/// Maps a service response of any supported shape into ranked records
pub fn normalize(
    response: ServiceResponse,
    options: &NormalizeOptions,
) -> RecommendResult<Vec<RecommendationRecord>> {
    let body = match response {
        ServiceResponse::NoContent => return Ok(Vec::new()),
        ServiceResponse::Body(body) => body,
    };

    let envelope: Value = serde_json::from_slice(&body)
        .map_err(|e| RecommendError::decode("$", format!("response is not valid JSON: {}", e)))?;
    let mut envelope = match envelope {
        Value::Object(map) => map,
        other => {
            return Err(RecommendError::decode(
                "$",
                format!("expected an object, found {}", json_kind(&other)),
            ))
        }
    };

    let items = match envelope.remove("suggested") {
        None => return Err(RecommendError::decode("suggested", "missing field")),
        // An empty Go slice is serialized as null
        Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(RecommendError::decode(
                "suggested",
                format!("expected an array, found {}", json_kind(&other)),
            ))
        }
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| normalize_item(index, item, options))
        .collect::<RecommendResult<Vec<_>>>()?;

    tracing::debug!(count = records.len(), "Normalized recommendations");
    Ok(records)
}

fn normalize_item(
    index: usize,
    item: Value,
    options: &NormalizeOptions,
) -> RecommendResult<RecommendationRecord> {
    let field = |name: &str| format!("suggested[{}].{}", index, name);

    let mut item = match item {
        Value::Object(map) => map,
        other => {
            return Err(RecommendError::decode(
                format!("suggested[{}]", index),
                format!("expected an object, found {}", json_kind(&other)),
            ))
        }
    };

    // The current service omits a zero rank entirely
    let rank = match item.remove("rank") {
        None | Some(Value::Null) => 0,
        Some(value) => value
            .as_u64()
            .and_then(|r| u32::try_from(r).ok())
            .ok_or_else(|| {
                RecommendError::decode(
                    field("rank"),
                    format!("expected a non-negative integer, found {}", value),
                )
            })?,
    };

    let similarity_score = match item.remove("similarity_score") {
        None | Some(Value::Null) => None,
        Some(value) => Some(SimilarityScore(value.as_f64().ok_or_else(|| {
            RecommendError::decode(
                field("similarity_score"),
                format!("expected a number, found {}", value),
            )
        })?)),
    };

    let perfume = item
        .remove("perfume")
        .ok_or_else(|| RecommendError::decode(field("perfume"), "missing field"))?;
    let perfume = WirePerfume::from_value(perfume)
        .map_err(|e| RecommendError::decode(field("perfume"), e.to_string()))?;

    let shape = perfume.shape();
    let mut record = match perfume {
        WirePerfume::Current(p) => from_current(p),
        WirePerfume::Glued(p) => from_glued(p).map_err(|e| e.at(field("perfume.links")))?,
        WirePerfume::Flat(p) => from_flat(p),
    };

    record.rank = rank;
    record.similarity_score = similarity_score;
    record.image_url = resolve_image(record.image_url.take(), options);

    tracing::trace!(rank, shape = ?shape, perfume = %record.display_name(), "Adapted suggestion");
    Ok(record)
}

// ============================================================================
// Shape adapters
// ============================================================================

fn from_current(perfume: CurrentPerfume) -> RecommendationRecord {
    let props = perfume.properties.unwrap_or_default();

    let tags = props.tags.map(|tags| match tags {
        WireTags::Weighted(weights) => weights.into_keys().collect::<BTreeSet<_>>(),
        WireTags::Listed(list) => list.into_iter().collect(),
    });

    RecommendationRecord {
        rank: 0,
        brand: perfume.brand,
        name: perfume.name,
        gender_affinity: non_blank(perfume.sex),
        image_url: perfume.image_url,
        properties: Properties {
            perfume_type: non_blank(props.perfume_type),
            family: props.family,
            upper_notes: props.upper_notes.unwrap_or_default(),
            core_notes: props.core_notes.unwrap_or_default(),
            base_notes: props.base_notes.unwrap_or_default(),
            tags,
            characteristics: Characteristics {
                upper: props.upper_characteristics,
                core: props.core_characteristics,
                base: props.base_characteristics,
            },
        },
        shops: perfume
            .shops
            .unwrap_or_default()
            .into_iter()
            .map(convert_shop)
            .collect(),
        similarity_score: None,
    }
}

fn convert_shop(shop: WireShop) -> Shop {
    let variants: Vec<Variant> = shop
        .variants
        .unwrap_or_default()
        .into_iter()
        .map(|v| Variant {
            volume: v.volume,
            price: v.price,
            link: v.link,
        })
        .collect();

    // Older current-shape payloads left the domain out; recover it from a link
    let domain = non_blank(shop.domain)
        .or_else(|| variants.iter().find_map(|v| link_host(&v.link)));

    Shop {
        shop_name: shop.shop_name,
        domain,
        variants,
    }
}

fn from_glued(perfume: GluedPerfume) -> Result<RecommendationRecord, AdapterError> {
    let props = perfume.properties;

    let mut links = Vec::new();
    for (volume, link) in perfume.links.unwrap_or_default() {
        let volume = volume
            .trim()
            .parse::<f64>()
            .map_err(|_| AdapterError(format!("volume key {:?} is not a number", volume)))?;
        links.push((volume, link));
    }

    Ok(RecommendationRecord {
        rank: 0,
        brand: perfume.brand,
        name: perfume.name,
        gender_affinity: non_blank(props.sex),
        image_url: perfume.image_url,
        properties: Properties {
            perfume_type: non_blank(props.perfume_type),
            family: props.family,
            upper_notes: props.upper_notes.unwrap_or_default(),
            core_notes: props.middle_notes.unwrap_or_default(),
            base_notes: props.base_notes.unwrap_or_default(),
            tags: None,
            characteristics: Characteristics::default(),
        },
        shops: shops_from_links(links),
        similarity_score: None,
    })
}

fn from_flat(perfume: FlatPerfume) -> RecommendationRecord {
    let links = non_blank(perfume.link)
        .map(|link| vec![(perfume.volume, link)])
        .unwrap_or_default();

    RecommendationRecord {
        rank: 0,
        brand: perfume.brand,
        name: perfume.name,
        gender_affinity: non_blank(perfume.sex),
        image_url: perfume.image_url,
        properties: Properties {
            perfume_type: non_blank(perfume.perfume_type),
            family: perfume.family,
            upper_notes: perfume.upper_notes.unwrap_or_default(),
            core_notes: perfume.middle_notes.unwrap_or_default(),
            base_notes: perfume.base_notes.unwrap_or_default(),
            tags: None,
            characteristics: Characteristics::default(),
        },
        shops: shops_from_links(links),
        similarity_score: None,
    }
}

/// Groups bare `(volume, link)` pairs into one shop per link host
///
/// Variants are ordered by volume; shops appear in the order their first
/// variant does. Legacy payloads never carried prices.
fn shops_from_links(mut links: Vec<(f64, String)>) -> Vec<Shop> {
    links.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut shops: Vec<Shop> = Vec::new();
    for (volume, link) in links {
        let domain = link_host(&link);
        let variant = Variant {
            volume,
            price: None,
            link,
        };
        match shops.iter_mut().find(|s| s.domain == domain) {
            Some(shop) => shop.variants.push(variant),
            None => shops.push(Shop {
                shop_name: shop_name_for(domain.as_deref()),
                domain,
                variants: vec![variant],
            }),
        }
    }
    shops
}

fn link_host(link: &str) -> Option<String> {
    Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

fn shop_name_for(domain: Option<&str>) -> String {
    match domain {
        Some(domain) => domain.strip_prefix("www.").unwrap_or(domain).to_string(),
        None => UNKNOWN_SHOP_NAME.to_string(),
    }
}

fn resolve_image(image_url: Option<String>, options: &NormalizeOptions) -> Option<String> {
    non_blank(image_url).or_else(|| options.placeholder_image.clone())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Adapter failure, located by the caller
struct AdapterError(String);

impl AdapterError {
    fn at(self, field: String) -> RecommendError {
        RecommendError::decode(field, self.0)
    }
}
