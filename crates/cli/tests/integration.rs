//! Integration tests for the Morpho P2P CLI.
//!
//! These tests run the binary against snapshot files written to temporary
//! directories.
//!
//! # Test Categories
//!
//! - **Query command tests**: markets, user and capacity
//! - **Simulation tests**: operation parsing, warnings and aborts
//! - **CLI validation tests**: Argument parsing, help text, error handling
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p morpho-p2p-cli --test integration
//! ```

mod integration {
    pub mod helpers;
    pub mod query_tests;
    pub mod simulate_tests;
    pub mod cli_validation_tests;
}
