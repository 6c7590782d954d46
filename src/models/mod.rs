pub mod gender_affinity;
pub mod perfume;
pub mod request;
pub mod wire;

pub use gender_affinity::{GenderAffinity, UnknownGenderAffinity};
pub use perfume::{Characteristics, Properties, RecommendationRecord, Shop, SimilarityScore, Variant};
pub use request::{FlowKind, RecommendationRequest};
pub use wire::{ErrorEnvelope, ServiceResponse};
