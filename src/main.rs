use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use runstats::config::RunstatsConfig;
use runstats::report;
use runstats::stats::{bucket_records, BucketRequest, BucketSize};
use runstats::timeline::{timeline_records, TimelineEvent};
use runstats::Views;

#[derive(Parser)]
#[command(
    name = "runstats",
    about = "Availability buckets and status timelines for monitoring run records",
    version,
    long_about = None
)]
struct Cli {
    /// JSON array of run records (`-` reads stdin)
    #[arg(long, short, global = true, default_value = "-")]
    input: PathBuf,

    /// Reference time, RFC 3339 (defaults to now)
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON output for machine parsing
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest status, latest downtime and day/week/month availability
    Summary,

    /// Recent timeline and fine-grained rolling buckets
    Current,

    /// Latest status over the last day
    Status,

    /// Bucket runs across a date range
    Buckets {
        /// Bucket size: hour, day, week or month
        #[arg(long, default_value = "day")]
        size: BucketSize,

        /// Range start, RFC 3339
        #[arg(long)]
        start: DateTime<Utc>,

        /// Range end, RFC 3339
        #[arg(long)]
        end: DateTime<Utc>,

        /// Rolling windows ending at `end` instead of calendar buckets
        #[arg(long)]
        relative: bool,
    },

    /// Status timeline for runs completed in [start, end)
    Timeline {
        /// Range start, RFC 3339
        #[arg(long)]
        start: DateTime<Utc>,

        /// Range end, RFC 3339
        #[arg(long)]
        end: DateTime<Utc>,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn print_timeline(events: &[TimelineEvent]) {
    if events.is_empty() {
        println!("No runs in range.");
        return;
    }
    for event in events {
        println!("{}", report::format_event(event));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = RunstatsConfig::discover(cli.config.as_deref())?;
    let json = cli.json || config.output.json;
    let pretty = config.output.pretty;
    let now = cli.now.unwrap_or_else(Utc::now);

    let records = runstats::record::load_records(&cli.input)?;
    let views = Views::new(config.windows.clone());

    match cli.command {
        Commands::Summary => {
            tracing::info!(%now, "Summarizing runs");
            let summary = views.summarize(&records, now).context("Failed to summarize runs")?;
            if json {
                emit(&summary, pretty)?;
            } else {
                println!("\n=== Summary {} -> {} ===", summary.start, summary.end);
                match &summary.latest_status {
                    Some(event) => println!("Latest status:   {}", report::format_event(event)),
                    None => println!("Latest status:   none"),
                }
                match &summary.latest_downtime {
                    Some(event) => println!("Latest downtime: {}", report::format_event(event)),
                    None => println!("Latest downtime: none"),
                }
                println!("\n{}", report::bucket_header());
                for bucket in [&summary.day, &summary.week, &summary.month].into_iter().flatten() {
                    println!("{}", report::format_bucket(bucket));
                }
                println!();
            }
        }
        Commands::Current => {
            let stats = views.current(&records, now).context("Failed to compute current stats")?;
            if json {
                emit(&stats, pretty)?;
            } else {
                match &stats.latest_record {
                    Some(r) => println!("Latest run: {} ({})", r.id, r.status),
                    None => println!("Latest run: none"),
                }
                println!("\nTimeline:");
                print_timeline(&stats.timeline);
                println!("\n{} buckets ({}):", stats.buckets.len(), stats.bucket_size);
                println!("{}", report::bucket_header());
                for bucket in stats.buckets.iter().filter(|b| b.runs.total > 0) {
                    println!("{}", report::format_bucket(bucket));
                }
            }
        }
        Commands::Status => {
            let result = views.status(&records, now).context("Failed to compute status")?;
            if json {
                emit(&result, pretty)?;
            } else {
                match &result.latest_status {
                    Some(event) => println!("{}", report::format_event(event)),
                    None => println!("No runs since {}.", result.start),
                }
            }
        }
        Commands::Buckets {
            size,
            start,
            end,
            relative,
        } => {
            tracing::info!(%size, %start, %end, relative, "Bucketing runs");
            let request = BucketRequest {
                bucket_size: size,
                start,
                end,
            };
            let result = bucket_records(&records, &request, relative).context("Failed to bucket runs")?;
            if json {
                emit(&result, pretty)?;
            } else {
                println!("{}", report::bucket_header());
                for bucket in &result.buckets {
                    println!("{}", report::format_bucket(bucket));
                }
                println!("{}", report::format_bucket(&result.overall));
            }
        }
        Commands::Timeline { start, end } => {
            let events = timeline_records(&records, start, end).context("Failed to build timeline")?;
            if json {
                emit(&events, pretty)?;
            } else {
                print_timeline(&events);
            }
        }
    }

    Ok(())
}
