//! Cheese supply CLI - reshape and query the e-Stat cheese supply/demand table
//!
//! # Commands
//!
//! ```bash
//! cheese-supply serve                           # Start HTTP server (port 3000)
//! cheese-supply inspect data.csv                # Show columns, indicators, years
//! cheese-supply reshape data.csv -f csv         # Long format table
//! cheese-supply query data.csv -i 生産量 -i 輸入量 --from 2015
//! cheese-supply export data.csv -i 生産量 -o filtered.csv
//! ```
//!
//! Defaults come from the environment (`CHEESE_CSV_PATH`,
//! `CHEESE_HEADER_MARKER`, `CHEESE_PORT`, `.env` honored).

use clap::{Parser, Subcommand, ValueEnum};
use cheese_supply::{
    load_file, server::AppState, write_csv, Dataset, LoadOptions, QueryResult, Selection,
    Settings, WideTable, DOWNLOAD_FILE_NAME,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cheese-supply")]
#[command(about = "Reshape and query the e-Stat cheese supply/demand table", long_about = None)]
struct Cli {
    /// Header-row and label-column marker (default: 各種チーズ)
    #[arg(long, global = true)]
    marker: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what was found in a CSV file
    Inspect {
        /// Input CSV file (default: $CHEESE_CSV_PATH)
        input: Option<PathBuf>,
    },

    /// Output the long-format table
    Reshape {
        /// Input CSV file (default: $CHEESE_CSV_PATH)
        input: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Filter, pivot and compare
    Query {
        /// Input CSV file (default: $CHEESE_CSV_PATH)
        input: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = QueryFormat::Table)]
        format: QueryFormat,
    },

    /// Write the filtered rows as a UTF-8 (BOM) CSV
    Export {
        /// Input CSV file (default: $CHEESE_CSV_PATH)
        input: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output file
        #[arg(short, long, default_value = DOWNLOAD_FILE_NAME)]
        output: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Input CSV file (default: $CHEESE_CSV_PATH)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Port to listen on (default: $CHEESE_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory with the built dashboard to serve at /
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Indicator to include (repeatable; default: first two)
    #[arg(short, long = "indicator")]
    indicators: Vec<String>,

    /// First Gregorian year (default: earliest)
    #[arg(long)]
    from: Option<i32>,

    /// Last Gregorian year (default: latest)
    #[arg(long)]
    to: Option<i32>,
}

impl FilterArgs {
    fn selection(&self, dataset: &Dataset) -> Selection {
        let defaults = dataset.default_selection();
        Selection::new(
            if self.indicators.is_empty() {
                defaults.indicators
            } else {
                self.indicators.clone()
            },
            self.from.unwrap_or(defaults.year_from),
            self.to.unwrap_or(defaults.year_to),
        )
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum QueryFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let settings = Settings::from_env().with_marker(cli.marker);
    let options = LoadOptions {
        marker: settings.marker.clone(),
    };

    let result = match cli.command {
        Commands::Inspect { input } => cmd_inspect(&resolve_input(input, &settings), &options),

        Commands::Reshape {
            input,
            format,
            output,
        } => cmd_reshape(&resolve_input(input, &settings), &options, format, output.as_deref()),

        Commands::Query {
            input,
            filter,
            format,
        } => cmd_query(&resolve_input(input, &settings), &options, &filter, format),

        Commands::Export {
            input,
            filter,
            output,
        } => cmd_export(&resolve_input(input, &settings), &options, &filter, &output),

        Commands::Serve {
            file,
            port,
            static_dir,
        } => {
            let settings = settings.with_csv_path(file).with_port(port);
            cmd_serve(settings, options, static_dir).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn resolve_input(input: Option<PathBuf>, settings: &Settings) -> PathBuf {
    input.unwrap_or_else(|| settings.csv_path.clone())
}

fn cmd_inspect(input: &Path, options: &LoadOptions) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_file(input, options)?;
    let info = &dataset.info;
    let (first, last) = dataset.year_bounds();

    println!("📄 {}", input.display());
    println!("   Encoding:     {}", info.encoding);
    println!("   Header line:  {}", info.header_line + 1);
    println!("   Rows:         {}", info.row_count);
    println!("   Columns:      {}", info.columns.join(", "));
    println!("   Year columns: {}", info.year_columns.join(", "));
    if !info.undated_columns.is_empty() {
        println!("   ⚠️  Unconverted: {}", info.undated_columns.join(", "));
    }
    println!("   Years:        {}-{} ({})", first, last, dataset.years.len());
    println!("   Observations: {}", info.observation_count);
    println!("\n📋 Indicators ({}):", dataset.indicators.len());
    for (i, ind) in dataset.indicators.iter().enumerate() {
        println!("  [{:2}] {}", i + 1, ind);
    }

    Ok(())
}

fn cmd_reshape(
    input: &Path,
    options: &LoadOptions,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_file(input, options)?;
    let observations = &dataset.long.observations;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(observations)?;
            write_output(&json, output)?;
        }
        OutputFormat::Csv => {
            let bytes = cheese_supply::to_csv_bytes(observations)?;
            match output {
                Some(p) => {
                    fs::write(p, &bytes)?;
                    eprintln!("💾 Output written to: {}", p.display());
                }
                None => print!("{}", String::from_utf8_lossy(&bytes[3..])),
            }
        }
    }

    Ok(())
}

fn cmd_query(
    input: &Path,
    options: &LoadOptions,
    filter: &FilterArgs,
    format: QueryFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_file(input, options)?;
    let selection = filter.selection(&dataset);
    let result = dataset.query(&selection)?;

    match format {
        QueryFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        QueryFormat::Table => print_query(&result),
    }

    Ok(())
}

fn print_query(result: &QueryResult) {
    let sel = &result.selection;
    println!(
        "\n📊 {} ({}-{}), {} records\n",
        sel.indicators.join(", "),
        sel.year_from,
        sel.year_to,
        result.record_count
    );
    print!("{}", render_wide(&result.wide));
    println!("\n💬 {}", result.trend);
}

/// Plain-text rendering of the pivot, one row per year.
fn render_wide(wide: &WideTable) -> String {
    if wide.is_empty() {
        return "(no data)\n".to_string();
    }

    let mut out = format!("{:>6}", "西暦");
    for ind in &wide.indicators {
        out.push_str(&format!("  {:>14}", ind));
    }
    out.push('\n');

    for (year, row) in wide.years.iter().zip(&wide.cells) {
        out.push_str(&format!("{:>6}", year));
        for cell in row {
            let text = cell.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string());
            out.push_str(&format!("  {:>14}", text));
        }
        out.push('\n');
    }

    out
}

fn cmd_export(
    input: &Path,
    options: &LoadOptions,
    filter: &FilterArgs,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_file(input, options)?;
    let selection = filter.selection(&dataset);
    let rows = dataset.filtered(&selection)?;

    write_csv(&rows, output)?;
    eprintln!("💾 {} rows written to: {}", rows.len(), output.display());

    Ok(())
}

async fn cmd_serve(
    settings: Settings,
    options: LoadOptions,
    static_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_file(&settings.csv_path, &options)?;
    let state = AppState::new(dataset, options);
    cheese_supply::server::start_server(state, settings.port, static_dir).await?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
