//! Generator service implementations

pub mod limiter;
pub mod openai_client;

#[cfg(test)]
pub mod tests;

pub use limiter::LimitedModelClient;
pub use openai_client::RealModelClient;
