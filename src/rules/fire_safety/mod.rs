//! Fire Safety Code rules.

pub mod egress;
pub mod travel_distance;

pub use egress::EgressWidthRule;
pub use travel_distance::TravelDistanceRule;
