//! biolinks - a single-page link-in-bio site
//!
//! Renders a configurable list of profile links, records every outbound click
//! in a relational store and exposes a database health probe.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: management commands (init-db, stats, purge, config generate)
//!
//! # Architecture
//! - `storage`: connection initializer, retry wrapper and click persistence
//! - `services`: click validation, health probe, retention sweep
//! - `api`: HTTP handlers and middleware
//! - `interfaces`: command-line interface
//! - `config`: configuration management
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
