//! Remote video generation provider.
//!
//! Defines the [`provider::VideoProvider`] trait the lifecycle controller
//! is written against, its Gemini HTTP implementation, reference-image
//! loading, the operation state machine, the backoff poller and the
//! artifact downloader.

pub mod api;
pub mod client;
pub mod download;
pub mod messages;
pub mod operation;
pub mod poller;
pub mod provider;
pub mod reference;
