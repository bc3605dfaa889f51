//! Service implementations for the webserver
//!
//! Concrete implementations of the traits in `crate::traits`

pub mod artifact_store;
pub mod token_verifier;

#[cfg(test)]
pub mod tests;

pub use artifact_store::InMemoryArtifactStore;
pub use token_verifier::HttpTokenVerifier;
