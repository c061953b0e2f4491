//! testport-core
//!
//! Core library for converting bench-format operator tests into FlagGems
//! pytest modules.
//!
//! The crate is a single linear pipeline over text:
//! - `classify`: figure out which input file is which.
//! - `rewrite`: pattern substitutions from the bench convention to pytest.
//! - `assemble`: baseline extraction and the merged test module.
//! - `pipeline`: config, output layout, I/O and the stage chain.
//!
//! All substantive logic lives here so it is fully testable and reusable
//! from frontends other than the CLI.

pub mod model;
pub mod classify;
pub mod rewrite;
pub mod assemble;
pub mod pipeline;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
