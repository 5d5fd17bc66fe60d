//! Data models shared by the resolver, adapters, cascade and rule evaluator

pub mod location;
pub mod observation;
pub mod query;

pub use location::Coordinates;
pub use observation::{
    Ceiling, ForecastSegment, NormalizedObservation, SourceTier, UNKNOWN_CONDITION,
    UNLIMITED_CEILING_FT,
};
pub use query::FlightQuery;
