//! Core components shared across the pipeline.
//!
//! This module contains the foundational building blocks of the crate:
//! - The primary [`PulseError`] type.
//! - The bus-facing event models ([`MarketEvent`], [`NewsAlert`]).

/// The primary error type (`PulseError`) for the crate.
pub mod error;
/// Bus-facing event models shared by the consumer and embedders.
pub mod models;

pub use error::PulseError;
pub use models::{MarketEvent, NewsAlert};
