//! # Memoir Harness CLI (`memoir`)
//!
//! ## Usage
//!
//! ```bash
//! memoir --config ./config/memoir.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `memoir patch <doc>` | Replace a selected passage in a manuscript |
//! | `memoir context <doc>` | Show the text around a selection |
//! | `memoir advise <turns.json>` | Decide between a follow-up and a topic change |
//! | `memoir chapters <doc>` | List chapter headings |
//! | `memoir questions <reply>` | Extract expansion questions from a model reply |
//! | `memoir intent "<request>"` | Classify an edit request |
//!
//! ## Examples
//!
//! ```bash
//! memoir patch draft.txt --selection "작은 마을" --replacement "작은 바닷가 마을" -o draft.txt
//! memoir advise turns.json --analysis reply.json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use memoir_harness::edit::PatchSource;
use memoir_harness::{advise, chapters, config, edit, logging, questions};

/// Memoir Harness CLI: selection patching and interview flow tools.
///
/// A missing config file means built-in defaults. See
/// `config/memoir.example.toml` for every setting.
#[derive(Parser)]
#[command(
    name = "memoir",
    about = "Memoir Harness: selection patching and interview flow tools",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/memoir.toml")]
    config: PathBuf,

    /// Log debug diagnostics to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace a selected passage in a manuscript.
    ///
    /// The selection is located exactly, then with whitespace collapsed,
    /// then by its first and last 50 characters. Fails without writing
    /// anything if it cannot be found.
    Patch {
        /// Manuscript file.
        document: PathBuf,

        /// Selected text to replace.
        #[arg(long, required_unless_present = "patches", requires = "replacement")]
        selection: Option<String>,

        /// Replacement text.
        #[arg(long)]
        replacement: Option<String>,

        /// Char offset where the selection started when it was captured.
        #[arg(long)]
        start: Option<usize>,

        /// Char offset where the selection ended when it was captured.
        #[arg(long)]
        end: Option<usize>,

        /// The edit request that produced the replacement (kept in history).
        #[arg(long)]
        request: Option<String>,

        /// JSON file with an array of patches, applied in order.
        #[arg(long, conflicts_with = "selection")]
        patches: Option<PathBuf>,

        /// Write the result here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the text before and after a selection as JSON.
    Context {
        /// Manuscript file.
        document: PathBuf,

        /// Selected text.
        #[arg(long)]
        selection: String,

        /// Chars on each side, 200 to 500. Defaults to `[context].radius`.
        #[arg(long)]
        radius: Option<usize>,
    },

    /// Decide whether the next question should follow up or change topic.
    Advise {
        /// JSON array of conversation turns.
        turns: PathBuf,

        /// Saved `analyzeConversationFlow` call. Falls back to the heuristic
        /// when missing or invalid.
        #[arg(long)]
        analysis: Option<PathBuf>,
    },

    /// List the chapters of a manuscript.
    Chapters {
        /// Manuscript file.
        document: PathBuf,

        /// Only print the chapter containing this char offset.
        #[arg(long)]
        at: Option<usize>,
    },

    /// Extract expansion questions from a saved model reply.
    Questions {
        /// Reply text file.
        reply: PathBuf,

        /// Print a JSON array instead of a numbered list.
        #[arg(long)]
        json: bool,
    },

    /// Classify an edit request (expand, condense, emotional, modify, general).
    Intent {
        /// The request text.
        request: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_or_default(&cli.config)?;
    logging::init(&cfg.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Patch {
            document,
            selection,
            replacement,
            start,
            end,
            request,
            patches,
            output,
        } => {
            let source = match (patches, selection, replacement) {
                (Some(path), _, _) => PatchSource::File(path),
                (None, Some(selection), Some(replacement)) => PatchSource::Single {
                    selection,
                    replacement,
                    start,
                    end,
                    request,
                },
                _ => anyhow::bail!("either --patches or --selection with --replacement is required"),
            };
            edit::run_patch(&cfg, &document, source, output.as_deref())?;
        }
        Commands::Context {
            document,
            selection,
            radius,
        } => {
            edit::run_context(&cfg, &document, &selection, radius)?;
        }
        Commands::Advise { turns, analysis } => {
            advise::run_advise(&cfg, &turns, analysis.as_deref()).await?;
        }
        Commands::Chapters { document, at } => {
            chapters::run_chapters(&document, at)?;
        }
        Commands::Questions { reply, json } => {
            questions::run_questions(&reply, json)?;
        }
        Commands::Intent { request } => {
            edit::run_intent(&request)?;
        }
    }

    Ok(())
}
