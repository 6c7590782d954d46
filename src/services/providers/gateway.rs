/// HTTP provider talking to the Scently API gateway
///
/// API Flow:
/// 1. By name: GET {base}/suggest/perfume?brand=..&name=..[&use_ai=..][&sex=..]
/// 2. By tags: GET {base}/suggest/tags?tags=a,b,a[&sex=..]
///
/// Both answer with the `{ suggested: [...] }` envelope, 204 when nothing matched,
/// or an `{ error, message }` body with a non-2xx status.
use reqwest::{Client as HttpClient, StatusCode};
use std::time::Duration;
use url::Url;

use crate::{
    config::Config,
    error::{RecommendError, RecommendResult},
    models::{ErrorEnvelope, ServiceResponse},
    services::{
        call::{CallContext, REQUEST_ID_HEADER},
        providers::RecommendationProvider,
        request_builder::ServiceQuery,
    },
};

#[derive(Clone)]
pub struct GatewayProvider {
    http_client: HttpClient,
    base_url: String,
    origin: Option<String>,
    api_token: Option<String>,
}

impl GatewayProvider {
    /// Creates a provider for `base_url`, applying `timeout` to every request
    pub fn new(base_url: &str, timeout: Duration) -> RecommendResult<Self> {
        let parsed = Url::parse(base_url).map_err(|e| {
            RecommendError::validation("api_base_url", format!("{:?} is not a URL: {}", base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RecommendError::validation(
                "api_base_url",
                format!("unsupported scheme {:?}", parsed.scheme()),
            ));
        }

        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            origin: None,
            api_token: None,
        })
    }

    pub fn from_config(config: &Config) -> RecommendResult<Self> {
        let mut provider = Self::new(&config.api_base_url, config.request_timeout())?;
        provider.origin = config.origin.clone();
        provider.api_token = config.api_token.clone();
        Ok(provider)
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Builds the transport error for a non-2xx answer
    fn status_error(status: StatusCode, body: &str) -> RecommendError {
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
        let message = match envelope.best_message() {
            Some(message) => message.to_string(),
            None => format!(
                "API request failed: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string(),
        };

        RecommendError::Transport {
            status: Some(status.as_u16()),
            message,
        }
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for GatewayProvider {
    async fn fetch(
        &self,
        query: &ServiceQuery,
        call: &CallContext,
    ) -> RecommendResult<ServiceResponse> {
        let url = self.endpoint(query.path);

        let mut request = self
            .http_client
            .get(&url)
            .query(&query.params)
            .header(REQUEST_ID_HEADER, call.id.as_str());
        if let Some(origin) = &self.origin {
            request = request.header(reqwest::header::ORIGIN, origin);
        }
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(url = %url, params = ?query.params, "Sending recommendation request");

        let response = tokio::select! {
            biased;
            _ = call.cancel.cancelled() => return Err(RecommendError::Cancelled),
            response = request.send() => response?,
        };

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            tracing::info!(provider = self.name(), "No recommendations available");
            return Ok(ServiceResponse::NoContent);
        }

        let body = tokio::select! {
            biased;
            _ = call.cancel.cancelled() => return Err(RecommendError::Cancelled),
            body = response.bytes() => body?,
        };

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body);
            tracing::error!(
                status = %status,
                body = %body,
                provider = self.name(),
                "Recommendation request failed"
            );
            return Err(Self::status_error(status, &body));
        }

        tracing::info!(
            status = %status,
            bytes = body.len(),
            provider = self.name(),
            "Recommendation response received"
        );

        Ok(ServiceResponse::Body(body.to_vec()))
    }

    fn name(&self) -> &'static str {
        "gateway"
    }
}
