//! Acquisition and cleaning stages of the harvest pipeline.
//!
//! - Zip discovery and extraction (`archive`)
//! - URL export discovery and parsing (`urls`)
//! - Single-attempt page fetching (`fetch`) under a pluggable politeness policy (`politeness`)
//! - Markup stripping (`extract`) and the persisted page maps (`pages`)

pub mod archive;
pub mod extract;
pub mod fetch;
pub mod pages;
pub mod politeness;
pub mod urls;
