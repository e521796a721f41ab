use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{miette, IntoDiagnostic, WrapErr};

use tomekeeper::config::ClientConfig;
use tomekeeper::core::boards::{calculate_stage_completion, BoardConfig};
use tomekeeper::core::formatters::process_formatting_tags;
use tomekeeper::core::logging;
use tomekeeper::core::search::map_book_ids_to_sources;

#[derive(Parser, Debug)]
#[command(name = "tomekeeper", version, about = "Offline helpers for the TTRPG assistant client")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Echo logs to stdout as well as the log file
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render inline formatting tags to HTML
    Render {
        /// Text to render; read from stdin when omitted
        text: Option<String>,
    },

    /// Compute a stage's completion from a board configuration file
    Completion {
        /// Board configuration JSON (backend or client shape)
        board: PathBuf,
        /// Stage key
        stage: String,
        /// Completed template ids
        completed: Vec<String>,
    },

    /// Map book ids to source codes
    Sources {
        book_ids: Vec<String>,
    },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load_from(path).into_diagnostic()?,
        None => ClientConfig::load(),
    };
    config.logging.stdout = cli.verbose;
    let _log_guard = logging::init(&config.logging);
    tracing::debug!("{} v{} starting", tomekeeper::NAME, tomekeeper::VERSION);

    match cli.command {
        Command::Render { text } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buffer)
                        .into_diagnostic()
                        .wrap_err("Failed to read stdin")?;
                    buffer
                }
            };
            println!("{}", process_formatting_tags(&text));
        }

        Command::Completion {
            board,
            stage,
            completed,
        } => {
            let raw = std::fs::read_to_string(&board)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to read {}", board.display()))?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .into_diagnostic()
                .wrap_err("Board file is not valid JSON")?;
            let config = BoardConfig::from_json(value).into_diagnostic()?;
            let stage_definition = config
                .stage(&stage)
                .ok_or_else(|| miette!("Board '{}' has no stage '{}'", config.board_type, stage))?;

            let completed: HashSet<String> = completed.into_iter().collect();
            let status = calculate_stage_completion(stage_definition, &completed);
            let rendered = serde_json::to_string_pretty(&status).into_diagnostic()?;
            println!("{rendered}");
        }

        Command::Sources { book_ids } => {
            for source in map_book_ids_to_sources(&book_ids) {
                println!("{source}");
            }
        }
    }

    Ok(())
}
