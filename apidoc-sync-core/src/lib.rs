#![doc = "apidoc-sync-core: core logic library for apidoc-sync."]

//! This crate contains the documentation pipeline: collecting a codebase,
//! prompting a model for an OpenAPI document, persisting it and publishing it.
//! Network clients are not included here; they live in the CLI crate and plug
//! in through the traits in [`contract`].
//!
//! # Usage
//! Add this as a dependency for all shared collection, generation and publishing code.

pub mod config;
pub mod contract;
pub mod extract;
pub mod generate;
pub mod prompt;
pub mod publish;
pub mod read_files;
pub mod spec_store;
