//! blotter: terminal viewer for the police records backend.
//!
//! Loads one entity collection, applies the filter given on the command
//! line and prints the table, the "Showing N of M" line and the collection
//! statistics. With `--watch` the view stays mounted and reprints after
//! every timed refresh until Ctrl-C.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blotter_client::{
    ApiStatus, ClientConfig, EnrichedEvidenceSource, FailurePolicy, FilteredView, HttpClient,
    HttpSource, OverviewLoader, RecordSource, RecordStore, RecordView, StoreEvent,
};
use blotter_core::stats::evidence_by_type;
use blotter_core::validation::{is_valid_badge_number, validate_password, BADGE_RULE};
use blotter_core::{
    fallback, ActivityKind, Case, CaseStats, CategoryCounts, Criminal, CriminalStats, Evidence,
    Officer, OfficerStats, Record,
};

#[derive(Parser)]
#[command(name = "blotter")]
#[command(author, version, about = "Terminal viewer for police records")]
#[command(propagate_version = true)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// Write logs to a daily-rotated file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Args)]
struct ViewArgs {
    /// Free-text search across the collection's searchable fields
    #[arg(short, long, default_value = "")]
    search: String,

    /// Keep refreshing on the configured interval until Ctrl-C
    #[arg(short, long)]
    watch: bool,

    /// Print the filtered records as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List criminal profiles
    Criminals {
        #[command(flatten)]
        view: ViewArgs,

        /// LOW, MEDIUM, HIGH, EXTREME or all
        #[arg(long)]
        threat_level: Option<String>,

        /// incarcerated, at_large or all
        #[arg(long)]
        custody: Option<String>,

        /// M, F, O or all
        #[arg(long)]
        gender: Option<String>,
    },

    /// List crime cases
    Cases {
        #[command(flatten)]
        view: ViewArgs,

        /// OPEN, CLOSED, CONVICTED or all
        #[arg(long)]
        status: Option<String>,

        /// Crime type (e.g. THEFT) or all
        #[arg(long)]
        crime_type: Option<String>,

        /// Clear the list instead of showing the built-in sample cases
        /// when the backend is unreachable
        #[arg(long)]
        no_fallback: bool,
    },

    /// List evidence items with resolved criminal names
    Evidence {
        #[command(flatten)]
        view: ViewArgs,

        /// Evidence type (e.g. PHOTO) or all
        #[arg(long)]
        evidence_type: Option<String>,
    },

    /// List officers
    Officers {
        #[command(flatten)]
        view: ViewArgs,

        /// CONSTABLE, SERGEANT, INSPECTOR, COMMISSIONER or all
        #[arg(long)]
        rank: Option<String>,

        /// active, inactive or all
        #[arg(long)]
        activity: Option<String>,
    },

    /// Dashboard headline statistics
    Overview {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check registration credentials against the password and badge rules
    ValidateRegistration {
        #[arg(long)]
        password: String,

        /// Password confirmation
        #[arg(long)]
        confirm: String,

        /// Badge number (P followed by 5 digits)
        #[arg(long)]
        badge: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_format, cli.log_file.as_deref());

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat, file: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "blotter=info,blotter_client=info,blotter_core=warn".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(path) = file {
        let dir = path.parent().unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("blotter.log");
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
        match format {
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                .init(),
            LogFormat::Text => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init(),
        }
        Some(guard)
    } else {
        match format {
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init(),
            LogFormat::Text => registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init(),
        }
        None
    }
}

fn connect() -> Result<(ClientConfig, HttpClient)> {
    let config = ClientConfig::from_env();
    let client = HttpClient::new(config.clone()).context("invalid client configuration")?;
    info!(base_url = %config.base_url, "Using records backend");
    Ok((config, client))
}

async fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Criminals {
            view,
            threat_level,
            custody,
            gender,
        } => {
            let (config, client) = connect()?;
            let source: Arc<dyn RecordSource<Criminal>> =
                Arc::new(HttpSource::<Criminal>::new(client));
            let filters = [
                ("threat_level", threat_level),
                ("custody", custody),
                ("gender", gender),
            ];
            show(source, FailurePolicy::Clear, &view, &filters, &config).await
        }
        Commands::Cases {
            view,
            status,
            crime_type,
            no_fallback,
        } => {
            let (config, client) = connect()?;
            let source: Arc<dyn RecordSource<Case>> =
                Arc::new(HttpSource::<Case>::new(client));
            let policy = case_policy(no_fallback);
            let filters = [("status", status), ("crime_type", crime_type)];
            show(source, policy, &view, &filters, &config).await
        }
        Commands::Evidence {
            view,
            evidence_type,
        } => {
            let (config, client) = connect()?;
            let source: Arc<dyn RecordSource<Evidence>> =
                Arc::new(EnrichedEvidenceSource::from_client(client));
            let filters = [("evidence_type", evidence_type)];
            show(source, FailurePolicy::Clear, &view, &filters, &config).await
        }
        Commands::Officers {
            view,
            rank,
            activity,
        } => {
            let (config, client) = connect()?;
            let source: Arc<dyn RecordSource<Officer>> =
                Arc::new(HttpSource::<Officer>::new(client));
            let filters = [("rank", rank), ("activity", activity)];
            show(source, FailurePolicy::Clear, &view, &filters, &config).await
        }
        Commands::Overview { json } => {
            let (_, client) = connect()?;
            overview(client, json).await
        }
        Commands::ValidateRegistration {
            password,
            confirm,
            badge,
        } => Ok(validate_registration(&password, &confirm, &badge)),
    }
}

// =============================================================================
// RECORD VIEWS
// =============================================================================

/// The cases view keeps itself populated with sample cases unless told not to.
fn case_policy(no_fallback: bool) -> FailurePolicy<Case> {
    if no_fallback {
        FailurePolicy::Clear
    } else {
        FailurePolicy::fallback(fallback::cases())
    }
}

async fn show<R>(
    source: Arc<dyn RecordSource<R>>,
    policy: FailurePolicy<R>,
    args: &ViewArgs,
    filters: &[(&str, Option<String>)],
    config: &ClientConfig,
) -> Result<ExitCode>
where
    R: Record + Render + Serialize,
{
    let store = Arc::new(RecordStore::new(source).with_failure_policy(policy));
    let mut view = RecordView::new(store.clone());

    if args.watch {
        view.mount_with_refresh(config.refresh_interval()).await;
    } else {
        view.mount().await;
    }
    let mut events = store.subscribe();

    view.set_query(args.search.as_str());
    for (field, value) in filters {
        if let Some(value) = value {
            view.select_by_name(field, value)?;
        }
    }

    let filtered = view.filtered().await;
    print_view(&filtered, args.json)?;

    if !args.watch {
        return Ok(exit_code(filtered.snapshot().status));
    }

    eprintln!(
        "Refreshing every {}s, Ctrl-C to stop",
        config.refresh_interval_secs
    );
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl-C, stopping");
                break;
            }
            event = events.recv() => match event {
                Ok(StoreEvent::Loaded { .. }) | Ok(StoreEvent::Failed { .. }) => {
                    print_view(&view.filtered().await, args.json)?;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Dropped store events"),
                Err(RecvError::Closed) => break,
            }
        }
    }

    let status = store.status().await;
    view.unmount().await?;
    Ok(exit_code(status))
}

fn exit_code(status: ApiStatus) -> ExitCode {
    if status == ApiStatus::Error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_view<R>(view: &FilteredView<R>, json: bool) -> Result<()>
where
    R: Record + Render + Serialize,
{
    if json {
        let records: Vec<&R> = view.iter().collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let snapshot = view.snapshot();
    if let Some(message) = &snapshot.message {
        println!("[{}] {}", snapshot.status, message);
    }

    let rows: Vec<Vec<String>> = view.iter().map(Render::cells).collect();
    if rows.is_empty() {
        println!("No {} found", R::KIND.noun());
    } else {
        print_table(R::HEADER, &rows);
    }
    println!();
    println!("{}", view.summary().describe(R::KIND.noun()));
    R::print_stats(&snapshot.records);
    Ok(())
}

fn print_table(header: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    print_row(header.iter().copied(), &widths);
    let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    print_row(rules.iter().map(String::as_str), &widths);
    for row in rows {
        print_row(row.iter().map(String::as_str), &widths);
    }
}

fn print_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    println!("{}", padded.join("  ").trim_end());
}

fn print_counts(title: &str, counts: &CategoryCounts) {
    if counts.is_empty() {
        return;
    }
    let parts: Vec<String> = counts.iter().map(|(k, n)| format!("{} {}", k, n)).collect();
    println!("{}: {}", title, parts.join(", "));
}

/// Table layout and statistics for one entity type.
trait Render: Sized {
    const HEADER: &'static [&'static str];

    fn cells(&self) -> Vec<String>;

    fn print_stats(records: &[Self]);
}

fn cell(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

impl Render for Criminal {
    const HEADER: &'static [&'static str] = &["NAME", "ALIAS", "THREAT", "STATUS", "CRIMES"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.display_name(),
            cell(self.alias.as_deref()),
            cell(self.threat_level.as_deref()),
            self.incarceration_status().to_string(),
            self.crimes_count.map(|n| n.to_string()).unwrap_or_else(|| "-".into()),
        ]
    }

    fn print_stats(records: &[Self]) {
        let stats = CriminalStats::from_records(records);
        println!(
            "In custody {} ({}%), at large {}, extreme threat {}, high threat {}, violent {}, escape risk {}",
            stats.incarcerated,
            stats.incarceration_rate(),
            stats.at_large,
            stats.extreme_threat,
            stats.high_threat,
            stats.violent_offenders,
            stats.escape_risks
        );
        print_counts("By threat level", &CriminalStats::by_threat_level(records));
    }
}

impl Render for Case {
    const HEADER: &'static [&'static str] =
        &["TYPE", "STATUS", "DATE", "LOCATION", "CRIMINAL", "OFFICER"];

    fn cells(&self) -> Vec<String> {
        vec![
            cell(self.crime_type.as_deref()),
            cell(self.status.as_deref()),
            self.date_committed
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into()),
            cell(self.location.as_deref()),
            cell(self.criminal_name.as_deref()),
            cell(self.arresting_officer_name.as_deref()),
        ]
    }

    fn print_stats(records: &[Self]) {
        let stats = CaseStats::from_records(records);
        println!(
            "Open {}, cleared {}, clearance rate {}%",
            stats.open,
            stats.cleared,
            stats.clearance_rate()
        );
        print_counts("By crime type", &CaseStats::by_crime_type(records));
        print_counts("By month", &CaseStats::by_month(records));
    }
}

impl Render for Evidence {
    const HEADER: &'static [&'static str] = &["TYPE", "CASE", "CRIMINAL", "COLLECTED", "DESCRIPTION"];

    fn cells(&self) -> Vec<String> {
        vec![
            cell(self.evidence_type.as_deref()),
            cell(self.case_number.as_deref()),
            cell(self.criminal_name.as_deref()),
            self.date_collected
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into()),
            cell(self.description.as_deref()),
        ]
    }

    fn print_stats(records: &[Self]) {
        print_counts("By type", &evidence_by_type(records));
    }
}

impl Render for Officer {
    const HEADER: &'static [&'static str] = &["NAME", "BADGE", "RANK", "STATION", "ACTIVE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.display_name(),
            cell(self.badge_number.as_deref()),
            cell(self.rank.as_deref()),
            cell(self.station.as_deref()),
            cell(self.activity()),
        ]
    }

    fn print_stats(records: &[Self]) {
        let stats = OfficerStats::from_records(records);
        println!("Active {}, inactive {}", stats.active, stats.inactive);
    }
}

// =============================================================================
// OVERVIEW
// =============================================================================

async fn overview(client: HttpClient, json: bool) -> Result<ExitCode> {
    let overview = OverviewLoader::from_client(client).load().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(exit_code(overview.status));
    }

    if let Some(message) = &overview.message {
        println!("[{}] {}", overview.status, message);
    }
    if overview.fallback_used {
        println!("(showing sample figures)");
    }
    let stats = &overview.stats;
    println!("Total criminals   {}", stats.total_criminals);
    println!("  incarcerated    {}", stats.incarcerated);
    println!("  at large        {}", stats.at_large);
    println!("Active cases      {}", stats.active_cases);
    println!("Officers          {}", stats.officers);
    println!("Clearance rate    {}%", stats.clearance_rate);

    if !overview.recent_activity.is_empty() {
        println!();
        println!("Recent activity");
        for entry in &overview.recent_activity {
            let label = match entry.kind {
                ActivityKind::NewCriminal => "New criminal profile",
                ActivityKind::CaseUpdate => "Case update",
                ActivityKind::Arrest => "Arrest",
            };
            println!(
                "  [{:?}] {}: {} ({})",
                entry.priority,
                label,
                entry.name,
                entry.relative_time(overview.last_updated)
            );
        }
    }

    Ok(exit_code(overview.status))
}

// =============================================================================
// REGISTRATION
// =============================================================================

fn validate_registration(password: &str, confirm: &str, badge: &str) -> ExitCode {
    let mut problems: Vec<String> = validate_password(password)
        .into_iter()
        .map(|e| e.message)
        .collect();
    if password != confirm {
        problems.push("Passwords do not match".to_string());
    }
    if !is_valid_badge_number(badge) {
        problems.push(BADGE_RULE.message.to_string());
    }

    if problems.is_empty() {
        println!("Registration credentials are valid");
        ExitCode::SUCCESS
    } else {
        for problem in &problems {
            println!("- {}", problem);
        }
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cases_fall_back_by_default() {
        let cli = Cli::try_parse_from(["blotter", "cases"]).unwrap();
        let Commands::Cases { no_fallback, .. } = cli.command else {
            panic!("expected cases subcommand");
        };
        match case_policy(no_fallback) {
            FailurePolicy::Fallback(records) => assert_eq!(records.len(), 3),
            FailurePolicy::Clear => panic!("expected fallback policy"),
        }
    }

    #[test]
    fn test_no_fallback_clears() {
        let cli = Cli::try_parse_from(["blotter", "cases", "--no-fallback"]).unwrap();
        let Commands::Cases { no_fallback, .. } = cli.command else {
            panic!("expected cases subcommand");
        };
        assert!(matches!(case_policy(no_fallback), FailurePolicy::Clear));
    }
}
