//! Tripcast - web backend for a travel-content social account
//!
//! This library provides the core functionality behind the Tripcast HTTP
//! server: the credential store, the social platform client, the
//! image-search and text-generation clients, engagement analytics, and
//! post history backup.

pub mod analytics;
pub mod backup;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod media;
pub mod platforms;
pub mod service;
pub mod textgen;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use credentials::{CredentialKey, CredentialStore};
pub use error::{Result, TripcastError};
pub use types::{DmOutcome, MediaReference, Post};
