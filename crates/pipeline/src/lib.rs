//! Operation lifecycle controller.
//!
//! Ties the domain rules in `clipgen-core` to a [`clipgen_provider::provider::VideoProvider`]:
//! resolve and gate a request, submit it once, poll it to completion,
//! download the clip and record the sidecar that makes it extendable.

pub mod controller;
pub mod error;
pub mod extend;
pub mod generate;
pub mod query;
pub mod submit;

pub use controller::{Controller, JobOptions};
pub use error::PipelineError;
