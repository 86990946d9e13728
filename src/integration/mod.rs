//! Integration tests
//!
//! Mock engine pieces and end-to-end plugin flows.

pub mod fixtures;

mod e2e;
