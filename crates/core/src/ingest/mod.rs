pub mod error;
pub mod normalize;
pub mod provider;
pub mod retry;
pub mod types;
