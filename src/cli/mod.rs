//! CLI interface for pdfvault.
//!
//! Provides command-line argument parsing using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line interface for pdfvault.
#[derive(Parser)]
#[command(name = "pdfvault")]
#[command(author, version, about = "Sandboxed PDF document store", long_about = None)]
pub struct Cli {
    /// Storage root directory (overrides the config file).
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    #[cfg(feature = "server")]
    Serve {
        /// Address to listen on (e.g., "127.0.0.1:3000").
        #[arg(short, long)]
        listen: Option<String>,

        /// Directory of static files to serve at "/".
        #[arg(short, long)]
        static_dir: Option<PathBuf>,
    },

    /// Create (or overwrite) a PDF holding the given text.
    Write {
        /// Document name, must end in ".pdf".
        name: String,

        /// Text to place on the page. Read from stdin when omitted.
        content: Option<String>,
    },

    /// Append a page holding the given text to an existing PDF.
    Append {
        /// Document name, must end in ".pdf".
        name: String,

        /// Text to place on the new page. Read from stdin when omitted.
        content: Option<String>,
    },

    /// Print the text of a PDF, or its raw bytes with --raw.
    Read {
        /// Document name, must end in ".pdf".
        name: String,

        /// Output the raw PDF bytes instead of extracted text.
        #[arg(long)]
        raw: bool,

        /// Write output to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rename a PDF.
    Rename {
        /// Current document name.
        old_name: String,

        /// New document name.
        new_name: String,
    },

    /// Delete a PDF.
    Delete {
        /// Document name, must end in ".pdf".
        name: String,
    },

    /// Create a directory (and any missing parents) in the store.
    Mkdir {
        /// Directory name, may be nested (e.g., "2024/invoices").
        name: String,
    },

    /// Recursively delete a directory from the store.
    Rmdir {
        /// Directory name.
        name: String,
    },
}
