//! # Bone Atlas CLI (`bonectl`)
//!
//! Maps bone detector labels to catalog bones and builds the seed context
//! for a chat session about an X-ray.
//!
//! ## Usage
//!
//! ```bash
//! bonectl --config ./config/bones.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `bonectl init` | Create the SQLite database and run schema migrations |
//! | `bonectl import <file>` | Load catalog rows from a JSON array |
//! | `bonectl resolve <id>` | Resolve one detector label or mesh name |
//! | `bonectl normalize <id>` | Show the normalized form and lookup candidates |
//! | `bonectl bootstrap <case>` | Build the chat handoff for one image case |
//! | `bonectl bones` | List the catalog grouped into viewer cards |
//!
//! ## Examples
//!
//! ```bash
//! bonectl init
//! bonectl import ./data/bone_catalog.json
//! bonectl resolve Fourth_DistalL
//! bonectl bootstrap 42 --detections ./dets.json --image-url https://host/42.png
//! ```

use bone_atlas::{bones, bootstrap, config, import, logging, migrate, resolve_cmd};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bonectl",
    about = "Bone Atlas: detector label resolution and chat seed building for X-ray bone detection",
    version
)]
struct Cli {
    #[arg(long, global = true, default_value = "./config/bones.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalog database
    Init,

    /// Load catalog rows from a JSON array file
    Import { file: PathBuf },

    /// Resolve an identifier to a catalog bone (exit 1 when not found)
    Resolve { identifier: String },

    /// Print the normalized form of an identifier
    Normalize { identifier: String },

    /// Build the chat handoff for one image case
    Bootstrap {
        image_case_id: i64,

        /// JSON array of detections
        #[arg(long)]
        detections: PathBuf,

        #[arg(long)]
        image_url: String,

        #[arg(long)]
        content_type: Option<String>,

        #[arg(long)]
        question: Option<String>,

        #[arg(long)]
        top_k: Option<usize>,

        /// Existing conversation GUID to seed
        #[arg(long)]
        conversation_id: Option<String>,

        #[arg(long)]
        title: Option<String>,
    },

    /// List catalog bones grouped for the 3D viewer
    Bones,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // normalize is pure and works without a config file
    let cfg = if matches!(cli.command, Commands::Normalize { .. }) {
        config::Config::minimal()
    } else {
        config::load_config(&cli.config)?
    };
    logging::init(&cfg.logging)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { file } => {
            let stats = import::import_catalog(&cfg, &file).await?;
            println!(
                "Imported {} catalog rows ({} skipped).",
                stats.rows, stats.skipped
            );
        }
        Commands::Resolve { identifier } => {
            if !resolve_cmd::run_resolve(&cfg, &identifier).await? {
                std::process::exit(1);
            }
        }
        Commands::Normalize { identifier } => {
            resolve_cmd::run_normalize(&identifier)?;
        }
        Commands::Bootstrap {
            image_case_id,
            detections,
            image_url,
            content_type,
            question,
            top_k,
            conversation_id,
            title,
        } => {
            let request = bootstrap::BootstrapRequest {
                image_case_id,
                image_url,
                content_type,
                question,
                top_k: top_k.unwrap_or(cfg.bootstrap.top_k),
                detections: Vec::new(),
                conversation_id,
                title,
            };
            bootstrap::run_bootstrap(&cfg, &detections, request).await?;
        }
        Commands::Bones => {
            bones::run_bones(&cfg).await?;
        }
    }

    Ok(())
}
