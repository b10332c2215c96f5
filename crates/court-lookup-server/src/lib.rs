//! Court Lookup server: configuration, REST API, and terminal output for the lookup pipeline.

pub mod config;
pub mod output;
pub mod rest;
