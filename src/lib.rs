//! AkashaCMS command-line dispatcher
//!
//! Maps subcommands onto operations of an external content engine. Layers:
//! `domain` (site model), `application` (services), `infrastructure`
//! (engine, I/O boundaries, wiring) and `cli` (command table and dispatch).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
