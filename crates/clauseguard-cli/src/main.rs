use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use clauseguard_ai::OnnxEmbedder;
use clauseguard_core::{DEFAULT_MIN_CLAUSE_CHARS, load_risky_dataset, load_safe_dataset};
use clauseguard_scan::{DEFAULT_THRESHOLD, ScanOptions, build_knowledge_base, scan_document};
use clauseguard_store::KnowledgeBase;

mod display;

#[derive(Parser)]
#[command(name = "clauseguard", version, about = "Contract clause deviation scanner")]
struct Cli {
    /// LanceDB directory holding the clause index.
    #[arg(
        long,
        global = true,
        env = "CLAUSEGUARD_DB",
        default_value = "data/clauseguard.lance"
    )]
    db: PathBuf,

    /// Directory containing `model.onnx` and `tokenizer.json`.
    #[arg(
        long,
        global = true,
        env = "CLAUSEGUARD_MODEL_DIR",
        default_value = "models/all-MiniLM-L6-v2"
    )]
    model_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the clause index from the risky and safe datasets.
    Build {
        /// Risky-clause dataset (JSON array).
        #[arg(long)]
        risky: PathBuf,
        /// Safe-rewrite dataset (JSON array).
        #[arg(long)]
        safe: PathBuf,
    },
    /// Scan a document's extracted text against the current index.
    Scan {
        /// Plain-text file with the document's extracted text.
        document: PathBuf,
        /// Flag clauses whose nearest-neighbor distance is below this.
        #[arg(long, env = "CLAUSEGUARD_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
        threshold: f32,
        /// Minimum clause length in characters.
        #[arg(long, default_value_t = DEFAULT_MIN_CLAUSE_CHARS)]
        min_clause_chars: usize,
        /// Emit the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    info!("clauseguard v{}", env!("CARGO_PKG_VERSION"));

    let kb = KnowledgeBase::open(&cli.db)
        .await
        .context("opening knowledge base")?;
    let mut embedder = OnnxEmbedder::load(&cli.model_dir).context("loading embedding model")?;

    match cli.command {
        Command::Build { risky, safe } => {
            let risky_rows = load_risky_dataset(&risky)?;
            let safe_rows = load_safe_dataset(&safe)?;
            eprintln!(
                "Loaded {} risky clauses and {} safe rewrites",
                risky_rows.len(),
                safe_rows.len()
            );

            let start = Instant::now();
            let summary = build_knowledge_base(&kb, &mut embedder, &risky_rows, &safe_rows)
                .await
                .context("building knowledge base")?;
            print!("{}", display::render_build_summary(&summary));
            eprintln!(
                "Rebuilt {} in {:.1}s",
                cli.db.display(),
                start.elapsed().as_secs_f64()
            );
        }
        Command::Scan {
            document,
            threshold,
            min_clause_chars,
            json,
        } => {
            let text = std::fs::read_to_string(&document)
                .with_context(|| format!("reading {}", document.display()))?;
            let options = ScanOptions {
                threshold,
                min_clause_chars,
            };
            let report = scan_document(&kb, &mut embedder, &text, &options)
                .await
                .context("scanning document")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!(
                    "{}",
                    display::render_report(&report, &document.display().to_string(), threshold)
                );
                eprintln!("Completed at {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }
    }
    Ok(())
}
