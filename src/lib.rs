//! hyperbolic-adapter - Hyperbolic provider adapter for agent frameworks.
//!
//! ## Architecture
//!
//! One [`HyperbolicClient`] per configured model. It exposes two operations
//! behind the [`ModelProvider`] trait:
//! - **generate**: chat turns → flattened prompt → `/completions`
//! - **embed**: text → `/embeddings`
//!
//! Both pass a per-client [`Throttle`] first. Construction errors
//! (bad model identifier, missing API key) are returned to the caller;
//! request errors are absorbed into fallback values.

pub mod client;
pub mod models;

// Re-exports for convenience
pub use client::{FALLBACK_RESPONSE, HyperbolicClient, ModelProvider, Throttle, flatten_prompt};
pub use models::{
    EnvKeys, KeyChain, KeySource, ProviderConfig, ProviderError, Result, Role, StaticKeys,
    StrictAlternation, Turn, TurnNormalizer,
};
