//! Websum is a command-line client for a remote website-summarization API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the provider catalog, user configuration, the summarizer
//!   HTTP client, and the SSE stream ingestion that turns response bytes into
//!   summary fragments and a terminal outcome.
//! - [`api`] defines the wire payloads exchanged with the summarizer backend.
//! - [`cli`] parses arguments, assembles a request, and drives it end to end,
//!   printing fragments as they arrive.
//! - [`utils`] carries small shared helpers (URL joining, transcript files).
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
