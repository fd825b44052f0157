//! Application module: command line, configuration and process startup

pub mod cli;
pub mod config;
pub mod startup;
