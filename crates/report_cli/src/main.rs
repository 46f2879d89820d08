//! Report CLI: preview and print reports from a JSON data file
//!
//! Usage:
//!   report_cli list
//!   report_cli run --report r101 --data residents.json -f purok=Go -f bloodType=O+ --generate
//!
//! Logs go to stderr and to target/logs/report_cli.log.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use contracts::reports::catalogue;
use contracts::shared::report::ColumnType;
use report_engine::{
    emitter_for, load_config, ColumnFormatter, DocumentFormat, InMemoryDataSource, ReportSession,
    SessionEvent,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "report_cli")]
#[command(about = "Preview and generate printable reports")]
#[command(version)]
struct Cli {
    /// Path to a config.toml (defaults to the one next to the executable)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available reports and their filters
    List,

    /// Preview a report and optionally generate the document
    Run {
        /// Report id or index, e.g. r101_health_records or r101
        #[arg(short, long)]
        report: String,

        /// JSON file holding an array of records
        #[arg(short, long)]
        data: PathBuf,

        /// Filter as key=value, repeatable
        #[arg(short = 'f', long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        /// Lower date bound, YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,

        /// Upper date bound, YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,

        /// Rows returned to the preview by the data source
        #[arg(long)]
        limit: Option<usize>,

        /// Preview rows printed to stdout
        #[arg(long, default_value_t = 20)]
        show: usize,

        /// Generate the printable document after the preview
        #[arg(short, long)]
        generate: bool,

        /// Override the configured document format
        #[arg(long)]
        format: Option<FormatArg>,

        /// Override the configured output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Html,
    Csv,
}

impl From<FormatArg> for DocumentFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => DocumentFormat::Html,
            FormatArg::Csv => DocumentFormat::Csv,
        }
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing filter key in {:?}", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("report_cli.log"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    match cli.command {
        Commands::List => {
            cmd_list();
            Ok(())
        }
        Commands::Run {
            report,
            data,
            filters,
            from,
            to,
            limit,
            show,
            generate,
            format,
            output,
        } => {
            let args = RunArgs {
                config: cli.config,
                report,
                data,
                filters,
                from,
                to,
                limit,
                show,
                generate,
                format,
                output,
            };
            cmd_run(args).await
        }
    }
}

fn cmd_list() {
    for definition in catalogue() {
        println!("{}  {} ({:?})", definition.id, definition.title, definition.orientation);
        for filter in &definition.filters {
            let options: Vec<&str> = filter
                .options
                .iter()
                .flatten()
                .map(|o| o.value.as_str())
                .collect();
            if options.is_empty() {
                println!("    {:<14} {:?}", filter.key, filter.kind);
            } else {
                println!("    {:<14} {:?} [{}]", filter.key, filter.kind, options.join(", "));
            }
        }
        if definition.date_range_enabled {
            println!("    --from/--to    date range");
        }
    }
}

struct RunArgs {
    config: Option<PathBuf>,
    report: String,
    data: PathBuf,
    filters: Vec<(String, String)>,
    from: Option<String>,
    to: Option<String>,
    limit: Option<usize>,
    show: usize,
    generate: bool,
    format: Option<FormatArg>,
    output: Option<PathBuf>,
}

async fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let definition = contracts::reports::find(&args.report)
        .ok_or_else(|| anyhow!("unknown report: {} (see `report_cli list`)", args.report))?;

    let mut config = load_config(args.config.as_deref())?;
    if let Some(format) = args.format {
        config.document.format = format.into();
    }
    if let Some(dir) = &args.output {
        config.document.output_dir = dir.to_string_lossy().into_owned();
    }

    let mut source = InMemoryDataSource::from_json_file(&args.data, &definition)
        .with_context(|| format!("failed to load {}", args.data.display()))?;
    // the first date column is what --from/--to bound
    if let Some(column) = definition
        .columns
        .iter()
        .find(|c| c.column_type == ColumnType::Date)
    {
        source = source.with_date_key(column.key.clone());
    }
    if let Some(limit) = args.limit {
        source = source.with_preview_limit(limit);
    }

    let emitter = emitter_for(&config.document);
    let formatter = ColumnFormatter::from_config(&config);
    let mut session = ReportSession::new(definition, &config, Arc::new(source), emitter);
    tracing::info!(
        "Running {} in session {}",
        session.definition().title,
        session.id()
    );

    // edits first so open() issues a single fetch with the final filters
    for (key, value) in &args.filters {
        session.edit_filter(key, value)?;
    }
    if args.from.is_some() || args.to.is_some() {
        session.edit_date_range(args.from.as_deref(), args.to.as_deref())?;
    }
    session.open()?;

    for event in session.run_until_idle().await {
        if let SessionEvent::PreviewFailed(e) = event {
            bail!("preview failed: {}", e);
        }
    }

    print_preview(&session, &formatter, args.show);
    println!("{}", session.summary());

    if !args.generate {
        session.close();
        return Ok(());
    }

    session.generate()?;
    for event in session.run_until_idle().await {
        match event {
            SessionEvent::Generated(emitted) => {
                println!(
                    "Wrote {} ({} pages, {} rows)",
                    emitted.path.display(),
                    emitted.pages,
                    emitted.rows
                );
            }
            SessionEvent::GenerateFailed(e) => bail!("generate failed: {}", e),
            SessionEvent::EmissionFailed(e) => bail!("could not write document: {}", e),
            other => tracing::debug!("Ignoring event {:?}", other),
        }
    }
    Ok(())
}

fn print_preview(session: &ReportSession, formatter: &ColumnFormatter, show: usize) {
    let columns = &session.definition().columns;
    let labels: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
    println!("{}", labels.join("\t"));
    for record in session.preview_records().iter().take(show) {
        println!("{}", formatter.format_record(record, columns).join("\t"));
    }
    let hidden = session.preview_records().len().saturating_sub(show);
    if hidden > 0 {
        println!("... {} more", hidden);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("purok=Go"),
            Ok(("purok".to_string(), "Go".to_string()))
        );
        assert_eq!(
            parse_filter("bloodType = O+"),
            Ok(("bloodType".to_string(), "O+".to_string()))
        );
        // empty value unsets the filter
        assert_eq!(parse_filter("purok="), Ok(("purok".to_string(), String::new())));
        assert!(parse_filter("purok").is_err());
        assert!(parse_filter("=Go").is_err());
    }

    #[test]
    fn test_cli_parses_run_arguments() {
        let cli = Cli::try_parse_from([
            "report_cli",
            "run",
            "-r",
            "r101",
            "-d",
            "residents.json",
            "-f",
            "purok=Go",
            "--filter",
            "bloodType=O+",
            "--format",
            "csv",
            "--generate",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                report,
                filters,
                generate,
                format,
                ..
            } => {
                assert_eq!(report, "r101");
                assert_eq!(filters.len(), 2);
                assert!(generate);
                assert!(matches!(format, Some(FormatArg::Csv)));
            }
            Commands::List => panic!("expected run"),
        }
    }
}
