pub mod client;
pub mod credentials;
pub mod gallery;

pub use client::{ApiClient, ApiError};
pub use credentials::{CredentialStore, StoredSession};
pub use gallery::{FetchTicket, GalleryMode, GalleryStore};
