pub mod client;
pub mod credentials;

pub use client::{ApiError, PortalApi, PortalClient};
pub use credentials::{CredentialError, CredentialProvider, StaticToken, StoredToken, TokenFile};
