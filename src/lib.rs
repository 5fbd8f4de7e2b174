pub mod config;
pub mod error;
pub mod normalize;
pub mod registry;
pub mod similarity;

// Batch boundaries: ports and use case, plus file adapters
pub mod app;
pub mod infra;

pub mod observability;

pub use normalize::{
    normalize, LocationFailure, LocationInput, LocationNormalizer, NormalizedLocation,
    ResolutionStrategy, ReviewTier,
};
