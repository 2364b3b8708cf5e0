//! CLI integration tests for mapfence.
//!
//! These tests execute the compiled binary and verify CLI behavior including:
//! - Subcommand behavior (extract, check, render)
//! - Stdin/stdout handling
//! - Exit codes
//! - Config discovery

mod check;
mod common;
mod extract;
mod render;
