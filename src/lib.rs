//! scylla-kit - command-line toolkit for ScyllaDB clusters.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod cloud;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod loader;
pub mod logging;
