//! Domain logic for clip generation requests.
//!
//! Pure building blocks shared by the provider, pipeline and CLI crates:
//! parameter enumerations, request validation, the preset resolver, the
//! cost gate, sidecar metadata and the command output schema.

pub mod cost;
pub mod error;
pub mod metadata;
pub mod output;
pub mod params;
pub mod preset;
pub mod request;
pub mod types;
