// src/config/mod.rs

//! Everything between raw options and a validated request.
//!
//! - [`normalize`] trims/unquotes option values and decodes base64 arguments.
//! - [`builder`] validates them and produces an [`ExecutionRequest`].
//! - [`loader`] reads run options from a TOML run file.
//! - [`request`] defines the request itself.

pub mod builder;
pub mod loader;
pub mod normalize;
pub mod request;

pub use builder::build_request;
pub use loader::load_run_file;
pub use normalize::{NormalizedOptions, normalize};
pub use request::{Credentials, ExecutionRequest, OutputFiles};
