//! datanorm command-line application
//!
//! Argument parsing and layered configuration for the `datanorm` binary.

pub mod cli;
pub mod config;
