pub mod entitlement;
pub mod rotation;
pub mod carousel;

pub use entitlement::{filter_upcoming, start_of_day, Lineup};
pub use rotation::{Rotation, RotationError, RotationState};
pub use carousel::Carousel;
