pub mod webinar;
pub mod member;
pub mod merchandise;
pub mod package;

pub use webinar::Webinar;
pub use member::{Executive, Member};
pub use merchandise::{FulfillmentRequest, Product, RequestStatus};
pub use package::Package;
