use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::{
    config::Config,
    error::RecommendResult,
    models::{FlowKind, GenderAffinity, RecommendationRecord, RecommendationRequest},
    selection::SelectionSet,
    services::{
        call::{CallContext, Resolution},
        normalizer::{normalize, NormalizeOptions},
        providers::{GatewayProvider, RecommendationProvider},
        request_builder,
    },
    state::AsyncState,
    store::{FileStore, GenderPreference},
};

pub type Recommendations = Vec<RecommendationRecord>;

/// How overlapping calls within one flow are reconciled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RacePolicy {
    /// Whichever call resolves last writes the state, even if a newer call
    /// was issued in the meantime
    #[default]
    LastResolvedWins,
    /// Only the most recently issued call may write the state
    LatestIssuedWins,
}

struct Flow {
    state: AsyncState<Recommendations>,
    latest_issued: u64,
}

impl Flow {
    fn new() -> Self {
        Self {
            state: AsyncState::idle(),
            latest_issued: 0,
        }
    }
}

/// Drives both recommendation flows through idle/loading/success/error
///
/// Each flow keeps its own state; cloning the orchestrator shares it.
/// Failures are recorded in the flow state as a user-facing message and also
/// returned to the caller unchanged.
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    provider: Arc<dyn RecommendationProvider>,
    preferences: GenderPreference,
    options: NormalizeOptions,
    policy: RacePolicy,
    by_name: Arc<RwLock<Flow>>,
    by_tags: Arc<RwLock<Flow>>,
}

impl RecommendationOrchestrator {
    pub fn new(provider: Arc<dyn RecommendationProvider>, preferences: GenderPreference) -> Self {
        Self {
            provider,
            preferences,
            options: NormalizeOptions::default(),
            policy: RacePolicy::default(),
            by_name: Arc::new(RwLock::new(Flow::new())),
            by_tags: Arc::new(RwLock::new(Flow::new())),
        }
    }

    /// Wires the HTTP gateway and file-backed preferences from configuration
    pub fn from_config(config: &Config) -> RecommendResult<Self> {
        let provider = GatewayProvider::from_config(config)?;
        let preferences =
            GenderPreference::new(Arc::new(FileStore::new(config.preferences_path.clone())));

        Ok(Self::new(Arc::new(provider), preferences)
            .with_normalize_options(NormalizeOptions::with_placeholder(
                config.placeholder_image.clone(),
            ))
            .with_race_policy(config.race_policy))
    }

    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_race_policy(mut self, policy: RacePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn preferences(&self) -> &GenderPreference {
        &self.preferences
    }

    fn flow(&self, kind: FlowKind) -> &Arc<RwLock<Flow>> {
        match kind {
            FlowKind::ByName => &self.by_name,
            FlowKind::ByTags => &self.by_tags,
        }
    }

    /// Snapshot of a flow's current state
    pub async fn state(&self, kind: FlowKind) -> AsyncState<Recommendations> {
        self.flow(kind).read().await.state.clone()
    }

    /// Forces a flow back to idle, e.g. when switching recommendation mode
    ///
    /// Calls still in flight become stale, so under `LatestIssuedWins` they can
    /// no longer write into the idle state.
    pub async fn reset(&self, kind: FlowKind) {
        let mut flow = self.flow(kind).write().await;
        flow.latest_issued += 1;
        flow.state.reset();
        tracing::debug!(flow = %kind, latest = flow.latest_issued, "Flow reset");
    }

    pub async fn reset_all(&self) {
        self.reset(FlowKind::ByName).await;
        self.reset(FlowKind::ByTags).await;
    }

    /// Looks up perfumes similar to a known one, using the stored gender affinity
    pub async fn suggest_by_name(
        &self,
        brand: impl Into<String>,
        name: impl Into<String>,
        use_ai: Option<bool>,
    ) -> RecommendResult<Recommendations> {
        let request = RecommendationRequest::ByName {
            brand: brand.into(),
            name: name.into(),
            use_ai,
            gender_affinity: Some(self.preferences.load(GenderAffinity::default()).await),
        };
        self.suggest(request).await
    }

    /// Looks up perfumes matching the selected tags, using the stored gender affinity
    pub async fn suggest_by_selection(
        &self,
        selection: &SelectionSet,
    ) -> RecommendResult<Recommendations> {
        let request = RecommendationRequest::ByTags {
            tags: selection.tags().to_vec(),
            gender_affinity: Some(self.preferences.load(GenderAffinity::default()).await),
        };
        self.suggest(request).await
    }

    pub async fn suggest(&self, request: RecommendationRequest) -> RecommendResult<Recommendations> {
        self.suggest_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Runs one call; cancelling `cancel` abandons the network wait
    pub async fn suggest_with_cancel(
        &self,
        request: RecommendationRequest,
        cancel: CancellationToken,
    ) -> RecommendResult<Recommendations> {
        let kind = request.flow();
        let seq = {
            let mut flow = self.flow(kind).write().await;
            flow.latest_issued += 1;
            flow.state.begin_loading();
            flow.latest_issued
        };
        let call = CallContext::new(kind, seq, cancel);

        async {
            tracing::info!(provider = self.provider.name(), "Requesting recommendations");

            let result = self.execute(&request, &call).await;
            let resolution = self.settle(&call, &result).await;

            match &result {
                Ok(records) => tracing::info!(
                    count = records.len(),
                    resolution = ?resolution,
                    "Recommendations ready"
                ),
                Err(e) => tracing::warn!(
                    error = %e,
                    resolution = ?resolution,
                    "Recommendation request failed"
                ),
            }

            result
        }
        .instrument(call.span())
        .await
    }

    async fn execute(
        &self,
        request: &RecommendationRequest,
        call: &CallContext,
    ) -> RecommendResult<Recommendations> {
        // Validation must fail before any network traffic
        let query = request_builder::build(request)?;
        let response = self.provider.fetch(&query, call).await?;
        normalize(response, &self.options)
    }

    /// Writes the outcome into the flow state, subject to the race policy
    async fn settle(
        &self,
        call: &CallContext,
        result: &RecommendResult<Recommendations>,
    ) -> Resolution {
        let mut flow = self.flow(call.flow).write().await;
        let resolution = Resolution::classify(call.seq, flow.latest_issued);

        if let Resolution::Stale { latest } = resolution {
            if self.policy == RacePolicy::LatestIssuedWins {
                tracing::debug!(latest, "Discarding stale resolution");
                return resolution;
            }
            tracing::warn!(latest, "Older call resolved after a newer one was issued");
        }

        match result {
            Ok(records) => flow.state.succeed(records.clone()),
            Err(e) => flow.state.fail(e.user_message()),
        }
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecommendError;
    use crate::models::ServiceResponse;
    use crate::services::providers::MockRecommendationProvider;
    use crate::state::Status;
    use serde_json::json;

    fn payload(names: &[&str]) -> ServiceResponse {
        let suggested: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({
                    "perfume": {"brand": "Brand", "name": name, "shops": []},
                    "rank": i + 1,
                    "similarity_score": 0.9
                })
            })
            .collect();
        ServiceResponse::json(&json!({ "suggested": suggested }))
    }

    fn orchestrator(mock: MockRecommendationProvider) -> RecommendationOrchestrator {
        RecommendationOrchestrator::new(Arc::new(mock), GenderPreference::in_memory())
    }

    fn mock() -> MockRecommendationProvider {
        let mut mock = MockRecommendationProvider::new();
        mock.expect_name().return_const("mock");
        mock
    }

    #[tokio::test]
    async fn test_success_populates_data() {
        let mut provider = mock();
        provider
            .expect_fetch()
            .times(1)
            .returning(|_, _| Ok(payload(&["Aventus", "Santal 33"])));
        let orch = orchestrator(provider);

        let records = orch
            .suggest(RecommendationRequest::by_name("Creed", "Aventus"))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);

        let state = orch.state(FlowKind::ByName).await;
        assert_eq!(state.status(), Status::Success);
        assert_eq!(state.data().unwrap()[1].name, "Santal 33");
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn test_no_content_is_success_with_empty_data() {
        let mut provider = mock();
        provider
            .expect_fetch()
            .returning(|_, _| Ok(ServiceResponse::NoContent));
        let orch = orchestrator(provider);

        let records = orch
            .suggest(RecommendationRequest::by_tags(["fresh"]))
            .await
            .unwrap();
        assert!(records.is_empty());

        let state = orch.state(FlowKind::ByTags).await;
        assert_eq!(state.status(), Status::Success);
        assert_eq!(state.data(), Some(&Vec::new()));
    }

    #[tokio::test]
    async fn test_validation_error_skips_network() {
        let mut provider = mock();
        provider.expect_fetch().times(0);
        let orch = orchestrator(provider);

        let err = orch
            .suggest(RecommendationRequest::by_name(" ", "Aventus"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendError::Validation { field: "brand", .. }));

        let state = orch.state(FlowKind::ByName).await;
        assert_eq!(state.status(), Status::Error);
        assert_eq!(state.error(), Some("brand is required"));
        assert!(state.data().is_none());
    }

    #[tokio::test]
    async fn test_transport_error_is_recorded_and_returned() {
        let mut provider = mock();
        provider.expect_fetch().returning(|_, _| {
            Err(RecommendError::Transport {
                status: Some(404),
                message: "perfume not found".to_string(),
            })
        });
        let orch = orchestrator(provider);

        let err = orch
            .suggest(RecommendationRequest::by_name("Unknown", "Thing"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendError::Transport { status: Some(404), .. }));
        assert_eq!(
            orch.state(FlowKind::ByName).await.error(),
            Some("perfume not found")
        );
    }

    #[tokio::test]
    async fn test_decode_error_lands_in_error_state() {
        let mut provider = mock();
        provider
            .expect_fetch()
            .returning(|_, _| Ok(ServiceResponse::json(&json!({"perfumes": []}))));
        let orch = orchestrator(provider);

        let err = orch
            .suggest(RecommendationRequest::by_tags(["warm"]))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendError::Decode { ref field, .. } if field == "suggested"));
        assert_eq!(orch.state(FlowKind::ByTags).await.status(), Status::Error);
    }

    #[tokio::test]
    async fn test_error_then_success_clears_error() {
        let mut provider = mock();
        let mut seq = mockall::Sequence::new();
        provider
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Err(RecommendError::Transport {
                    status: None,
                    message: "connection refused".to_string(),
                })
            });
        provider
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(payload(&["Terre"])));
        let orch = orchestrator(provider);

        let request = RecommendationRequest::by_name("Hermes", "Terre");
        assert!(orch.suggest(request.clone()).await.is_err());
        assert!(orch.suggest(request).await.is_ok());

        let state = orch.state(FlowKind::ByName).await;
        assert_eq!(state.status(), Status::Success);
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn test_flows_are_independent() {
        let mut provider = mock();
        provider.expect_fetch().returning(|query, _| {
            if query.path == request_builder::SUGGEST_BY_TAGS_PATH {
                Ok(payload(&["Tag Match"]))
            } else {
                Err(RecommendError::Transport {
                    status: Some(500),
                    message: "Internal server error".to_string(),
                })
            }
        });
        let orch = orchestrator(provider);

        let _ = orch
            .suggest(RecommendationRequest::by_name("a", "b"))
            .await;
        orch.suggest(RecommendationRequest::by_tags(["sweet"]))
            .await
            .unwrap();

        assert_eq!(orch.state(FlowKind::ByName).await.status(), Status::Error);
        assert_eq!(orch.state(FlowKind::ByTags).await.status(), Status::Success);
    }

    #[tokio::test]
    async fn test_reset_returns_flow_to_idle() {
        let mut provider = mock();
        provider
            .expect_fetch()
            .returning(|_, _| Ok(payload(&["x"])));
        let orch = orchestrator(provider);

        orch.suggest(RecommendationRequest::by_tags(["fresh"]))
            .await
            .unwrap();
        orch.reset(FlowKind::ByTags).await;

        assert_eq!(orch.state(FlowKind::ByTags).await, AsyncState::idle());
    }

    #[tokio::test]
    async fn test_stored_preference_is_sent() {
        let mut provider = mock();
        provider
            .expect_fetch()
            .withf(|query, call| {
                query.param("sex") == Some("female")
                    && query.param("tags") == Some("floral,floral")
                    && call.flow == FlowKind::ByTags
                    && call.seq == 1
            })
            .times(1)
            .returning(|_, _| Ok(ServiceResponse::NoContent));
        let orch = orchestrator(provider);
        orch.preferences().set(GenderAffinity::Female).unwrap();

        let selection: SelectionSet = ["floral", "floral"].into_iter().collect();
        orch.suggest_by_selection(&selection).await.unwrap();
    }

    #[tokio::test]
    async fn test_by_name_defaults_to_unisex() {
        let mut provider = mock();
        provider
            .expect_fetch()
            .withf(|query, _| {
                query.param("sex") == Some("unisex") && query.param("use_ai") == Some("true")
            })
            .times(1)
            .returning(|_, _| Ok(ServiceResponse::NoContent));
        let orch = orchestrator(provider);

        orch.suggest_by_name("Dior", "Sauvage", Some(true))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_selection_fails_validation() {
        let mut provider = mock();
        provider.expect_fetch().times(0);
        let orch = orchestrator(provider);

        let err = orch
            .suggest_by_selection(&SelectionSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendError::Validation { field: "tags", .. }));
    }
}
