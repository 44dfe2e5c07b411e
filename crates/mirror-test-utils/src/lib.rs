//! Shared test utilities for the folder-mirror workspace.
//!
//! This crate provides standardised fixtures so every crate builds source and
//! replica trees the same way. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`]: [`tree::TestTree`], a temporary directory with builders and
//!   assertions
//! - [`pair`]: [`pair::MirrorPair`], a source/replica pair plus a log path

pub mod pair;
pub mod tree;

pub use pair::MirrorPair;
pub use tree::{Entry, TestTree};
