//! CLI subcommands.

pub mod parse;
