//! Shared building blocks for the ipwatch workspace.
//!
//! This crate provides:
//! - Parsing of target specifications (single address, last-octet range, CIDR block)
//! - Expansion of those specifications into the concrete IPv4 addresses to watch
#![cfg_attr(
    test,
    expect(clippy::indexing_slicing, reason = "This is not problematic in tests",)
)]

mod error;
mod expand;

pub use error::*;
pub use expand::*;
