//! Test support utilities for the jasstafel integration tests.
//!
//! Unified logging initialization and assertions on the problem-details
//! error contract.

pub mod logging;
pub mod problem_details;
