pub mod config;
pub mod error;
pub mod models;
pub mod selection;
pub mod services;
pub mod state;
pub mod store;

pub use error::{RecommendError, RecommendResult};
pub use models::{FlowKind, GenderAffinity, RecommendationRecord, RecommendationRequest};
pub use selection::{SelectionSet, TagGroup};
pub use services::{RacePolicy, RecommendationOrchestrator};
pub use state::{AsyncState, Status};
