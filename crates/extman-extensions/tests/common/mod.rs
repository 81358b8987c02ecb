//! Common test infrastructure for extman-extensions tests
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: Extension names, payloads and their digests
//! - `builders`: Fluent builders for archives and catalog entries
//! - `mock_server`: Wiremock setup for the API and distribution origins
//! - `fixtures`: Temporary config directories and resolved configs

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod fixtures;
pub mod mock_server;

pub use builders::*;
pub use constants::*;
pub use fixtures::*;
pub use mock_server::*;
