//! ch-crosscheck CLI - manual ClickHouse ingestion and cross-table row matching.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use ch_crosscheck::{
    run_compare, run_insert, Config, Error, HttpExecutor, LineReader, QueryExecutor,
    SchemaRegistry,
};

#[derive(Parser)]
#[command(name = "ch-crosscheck")]
#[command(about = "Manual ClickHouse ingestion and cross-table row matching")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert one row, prompting per column
    Insert {
        /// Target table (must have a registered reference schema)
        #[arg(default_value = "t_accessattributes")]
        table: String,
    },

    /// Count exact row matches between two tables
    Compare {
        /// Left-hand table
        left: String,

        /// Right-hand table
        right: String,
    },

    /// List tables in the configured database
    Tables,

    /// Show a table's introspected schema
    Schema {
        /// Table to introspect
        table: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let registry = SchemaRegistry::from_config(&config);
    let executor = HttpExecutor::new(&config)?;

    match cli.command {
        Commands::Insert { table } => {
            let mut reader = PromptReader;
            let outcome = run_insert(&executor, &registry, &mut reader, &table).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!(
                    "Inserted 1 row into {} ({} columns).",
                    outcome.table, outcome.columns
                );
            }
        }

        Commands::Compare { left, right } => {
            let outcome = run_compare(&executor, &left, &right).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("Comparison completed.");
                println!(
                    "  {}: {} rows ({} skipped)",
                    outcome.left_table, outcome.left_rows, outcome.left_skipped
                );
                println!(
                    "  {}: {} rows ({} skipped)",
                    outcome.right_table, outcome.right_rows, outcome.right_skipped
                );
                println!("  Matching pairs: {}", outcome.matches);
            }
        }

        Commands::Tables => {
            let tables = executor.show_tables().await?;
            if tables.is_empty() {
                return Err(Error::Executor("database contains no tables".into()));
            }

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                for table in tables {
                    println!("{}", table);
                }
            }
        }

        Commands::Schema { table } => {
            let schema = executor.fetch_schema(&table).await?;
            if schema.is_empty() {
                return Err(Error::MissingTable(table));
            }

            for column in schema.columns() {
                println!("{}\t{}", column.name, column.type_tag);
            }
        }
    }

    Ok(())
}

/// Terminal-backed line reader for the insert prompts.
struct PromptReader;

impl LineReader for PromptReader {
    fn read_line(&mut self, prompt: &str) -> Result<String, Error> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
    }
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
