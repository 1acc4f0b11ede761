//! Road routing CLI library.
//!
//! Command handlers, argument parsing helpers, and terminal rendering for the
//! `roadnet-cli` binary.

pub mod commands;
pub mod output;
pub mod terminal;
