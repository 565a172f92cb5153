pub mod api;
pub mod catalog;
pub mod reporting;
pub mod schedule;
pub mod storage;

pub use catalog::{Member, Package, RequestStatus, Webinar};
pub use schedule::{filter_upcoming, Carousel, Lineup};
pub use reporting::{Report, ReportAssembler};
