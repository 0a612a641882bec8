//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fabula - personalized illustrated storybook generation
#[derive(Parser, Debug)]
#[command(name = "fabula")]
#[command(about = "Generate personalized illustrated storybooks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a new book from a photo and child details
    Submit {
        /// Child's name
        #[arg(long)]
        name: String,

        /// Child's age in years
        #[arg(long)]
        age: u8,

        /// Free-text interests, e.g. "dragons and stars"
        #[arg(long, default_value = "")]
        interests: String,

        /// Path to the reference photo
        #[arg(long)]
        photo: PathBuf,

        /// Number of story pages (defaults from configuration)
        #[arg(long)]
        pages: Option<u8>,
    },

    /// Generate the premise and cover preview
    Preview {
        /// Book id
        id: String,
    },

    /// Regenerate only the preview cover
    RegenerateCover {
        /// Book id
        id: String,
    },

    /// Record payment, unlocking full generation
    Pay {
        /// Book id
        id: String,
    },

    /// Run the full generation pipeline and assemble the document
    Complete {
        /// Book id
        id: String,
    },

    /// Regenerate a single page image and rebuild the document
    RegeneratePage {
        /// Book id
        id: String,

        /// Page number, starting at 1
        page: u32,
    },

    /// Show a book's status and progress
    Status {
        /// Book id
        id: String,
    },
}
