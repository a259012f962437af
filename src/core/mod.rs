pub mod client;
pub mod config;
pub mod error;
pub mod providers;
pub mod summary_stream;
