use crate::{
    error::{RecommendError, RecommendResult},
    models::{GenderAffinity, RecommendationRequest},
};

pub const SUGGEST_BY_NAME_PATH: &str = "/suggest/perfume";
pub const SUGGEST_BY_TAGS_PATH: &str = "/suggest/tags";

/// The service joins tags with this separator and splits them back apart
const TAG_SEPARATOR: &str = ",";

/// A validated query ready to be sent, relative to the service base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceQuery {
    pub path: &'static str,
    pub params: Vec<(&'static str, String)>,
}

impl ServiceQuery {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Turns a typed request into a query, rejecting malformed input up front
pub fn build(request: &RecommendationRequest) -> RecommendResult<ServiceQuery> {
    match request {
        RecommendationRequest::ByName {
            brand,
            name,
            use_ai,
            gender_affinity,
        } => {
            let brand = require_text("brand", brand)?;
            let name = require_text("name", name)?;

            let mut params = vec![("brand", brand.to_string()), ("name", name.to_string())];
            if let Some(use_ai) = use_ai {
                params.push(("use_ai", use_ai.to_string()));
            }
            push_gender_affinity(&mut params, *gender_affinity);

            Ok(ServiceQuery {
                path: SUGGEST_BY_NAME_PATH,
                params,
            })
        }
        RecommendationRequest::ByTags {
            tags,
            gender_affinity,
        } => {
            if tags.is_empty() {
                return Err(RecommendError::validation(
                    "tags",
                    "at least one tag is required",
                ));
            }
            for tag in tags {
                if tag.trim().is_empty() {
                    return Err(RecommendError::validation("tags", "tags cannot be blank"));
                }
                if tag.contains(TAG_SEPARATOR) {
                    return Err(RecommendError::validation(
                        "tags",
                        format!("tag {:?} cannot contain '{}'", tag, TAG_SEPARATOR),
                    ));
                }
            }

            let joined = tags
                .iter()
                .map(|t| t.trim())
                .collect::<Vec<_>>()
                .join(TAG_SEPARATOR);
            let mut params = vec![("tags", joined)];
            push_gender_affinity(&mut params, *gender_affinity);

            Ok(ServiceQuery {
                path: SUGGEST_BY_TAGS_PATH,
                params,
            })
        }
    }
}

fn require_text<'a>(field: &'static str, value: &'a str) -> RecommendResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecommendError::validation(
            field,
            format!("{} is required", field),
        ));
    }
    Ok(trimmed)
}

fn push_gender_affinity(
    params: &mut Vec<(&'static str, String)>,
    gender_affinity: Option<GenderAffinity>,
) {
    if let Some(affinity) = gender_affinity {
        params.push(("sex", affinity.as_str().to_string()));
    }
}
