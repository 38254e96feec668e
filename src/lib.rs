//! pdfvault - A sandboxed PDF document store.
//!
//! Every document lives directly under a single storage root. Client-supplied
//! names are collapsed to their final segment before use, so no name can reach
//! outside the root. Documents can be created, read (raw or as text),
//! appended to, renamed, and deleted; subdirectories can be created and
//! removed.
//!
//! # Modules
//!
//! - [`storage`] - Name resolution, the store trait, and the filesystem store
//! - [`document`] - PDF byte transforms (create, append page, extract text)
//! - [`commands`] - Operations shared by the CLI and the HTTP server
//! - [`server`] - HTTP API (requires the `server` feature)
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line interface definitions

pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod storage;

#[cfg(feature = "server")]
pub mod server;
