//! # weft_cli
//!
//! Command implementations for the `weft` binary, exposed as a library so
//! integration tests can drive the full generate flow against a temporary
//! project directory.

pub mod commands;
