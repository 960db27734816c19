//! Core types and trait definitions for the Plotline survey intake service.
//!
//! This crate is deliberately free of HTTP, process, and database
//! dependencies. It holds the plot geometry model, the pure geometry engine,
//! the submission aggregate, and the contracts every external collaborator
//! and storage backend implements.

// Native `async fn` in traits (stabilised in Rust 1.75); the store trait
// spells out its `Send` futures explicitly.
#![allow(async_fn_in_trait)]

pub mod collab;
pub mod error;
pub mod geometry;
pub mod plot;
pub mod store;
pub mod submission;

pub use error::{Error, GeometryError, Result};
