pub mod call;
pub mod normalizer;
pub mod orchestrator;
pub mod providers;
pub mod request_builder;

pub use call::{CallContext, CallId, Resolution};
pub use normalizer::{normalize, NormalizeOptions};
pub use orchestrator::{RacePolicy, Recommendations, RecommendationOrchestrator};
pub use providers::{GatewayProvider, RecommendationProvider};
pub use request_builder::{build, ServiceQuery};
