//! Service tests for webserver

pub mod artifact_store;
pub mod token_verifier;
