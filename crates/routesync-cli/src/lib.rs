//! RouteSync CLI library.
//!
//! Command handlers, output rendering and terminal helpers for the
//! `routesync-cli` binary.

pub mod commands;
pub mod output;
pub mod terminal;
