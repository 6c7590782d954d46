/// Recommendation provider abstraction
///
/// The orchestrator only ever talks to the remote service through this trait,
/// so tests can swap the HTTP gateway for a mock.
use crate::{
    error::RecommendResult,
    models::ServiceResponse,
    services::{call::CallContext, request_builder::ServiceQuery},
};

pub mod gateway;

pub use gateway::GatewayProvider;

/// Sends an already validated query and returns the raw successful response
///
/// Implementations turn non-2xx statuses and network failures into
/// `RecommendError::Transport`, and treat 204 as `ServiceResponse::NoContent`.
/// Decoding the body is left to the normalizer.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    async fn fetch(
        &self,
        query: &ServiceQuery,
        call: &CallContext,
    ) -> RecommendResult<ServiceResponse>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
