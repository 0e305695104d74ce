//! # CLI Module
//!
//! Command-line front end of the generator, available as the `httpbind-gen`
//! binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Resolve a model and write the transport modules plus the API documents:
//!
//! ```bash
//! httpbind-gen generate --model api.yaml --output src/transport
//! ```
//!
//! Options:
//! - `--model <FILE>` - Path to the service model (required)
//! - `--output <DIR>` - Output directory (default from `httpbind.toml`)
//! - `--config <FILE>` - Generator configuration (auto-detected next to the model)
//! - `--dry-run` - List the files that would be written
//! - `--allow-failures` - Do not fail the run when some methods could not be bound
//!
//! ### `check`
//!
//! Resolve bindings and print any failures:
//!
//! ```bash
//! httpbind-gen check --model api.yaml
//! ```
//!
//! ### `routes`
//!
//! Print the mount table, one route per line:
//!
//! ```bash
//! httpbind-gen routes --model api.yaml
//! ```
//!
//! ### `openapi`
//!
//! Print a single API document:
//!
//! ```bash
//! httpbind-gen openapi --model api.yaml --version v2 --format json
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{execute, run_cli, Cli, Commands, FormatArg, VersionArg};
