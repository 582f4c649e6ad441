use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "metricdw", about = "Custom metric warehouse CLI")]
struct Cli {
    /// Database path (default: ~/.metricdw/metricdw.db)
    #[arg(long)]
    db: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage metric definitions
    Metric {
        #[command(subcommand)]
        action: MetricAction,
    },
    /// Log a value for a metric (one value per day, last write wins)
    Log {
        /// Metric ID
        metric_id: i64,
        /// Value to record
        value: f64,
        /// Day to record it on (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Fetch raw data points for a metric in a date range
    Range {
        /// Metric ID
        metric_id: i64,
        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Summarize a metric into time buckets with a formula
    Summary {
        /// Metric ID
        metric_id: i64,
        /// Timeframe: 1W, 1M, 3M, 6M, 1Y, ALL
        #[arg(long, default_value = "1M")]
        timeframe: String,
        /// Formula: sum, avg, >N, %>N
        #[arg(long, default_value = "sum")]
        formula: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show warehouse status
    Status,
}

#[derive(Subcommand)]
enum MetricAction {
    /// Create a metric
    Add {
        /// Metric name
        name: String,
        /// Metric type (free-form, e.g. number, minutes, boolean)
        #[arg(long, default_value = "number")]
        metric_type: String,
    },
    /// Update a metric's name and/or type
    Update {
        /// Metric ID
        metric_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        metric_type: Option<String>,
    },
    /// Remove a metric and all of its data points
    Rm {
        /// Metric ID
        metric_id: i64,
    },
    /// List metrics
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_date(s: &str) -> anyhow::Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("invalid date '{s}' (expected YYYY-MM-DD)"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let db = match &cli.db {
        Some(path) => metricdw::Database::open_at(path).await?,
        None => metricdw::Database::open().await?,
    };
    let dw = metricdw::Metricdw::new(db);

    match cli.command {
        Commands::Metric { action } => match action {
            MetricAction::Add { name, metric_type } => {
                let metric = dw.create_metric(&name, &metric_type).await?;
                println!("Created metric {} ({})", metric.metric_id, metric.name);
            }
            MetricAction::Update {
                metric_id,
                name,
                metric_type,
            } => {
                dw.update_metric(metric_id, name.as_deref(), metric_type.as_deref())
                    .await?;
                println!("Updated metric {metric_id}");
            }
            MetricAction::Rm { metric_id } => {
                dw.remove_metric(metric_id).await?;
                println!("Removed metric {metric_id} and its data points");
            }
            MetricAction::List { json } => {
                let metrics = dw.list_metrics().await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&metrics)?);
                } else if metrics.is_empty() {
                    println!("No metrics defined. Try: metricdw metric add <NAME>");
                } else {
                    for m in metrics {
                        println!("{:>4}  {}  [{}]", m.metric_id, m.name, m.metric_type);
                    }
                }
            }
        },
        Commands::Log {
            metric_id,
            value,
            date,
        } => {
            let date = date.as_deref().map(parse_date).transpose()?;
            let day = dw.log_value(metric_id, value, date).await?;
            println!("Logged {value} for metric {metric_id} on {day}");
        }
        Commands::Range {
            metric_id,
            start,
            end,
            json,
        } => {
            let observations = dw
                .range(metric_id, parse_date(&start)?, parse_date(&end)?)
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&observations)?);
            } else {
                for obs in observations {
                    println!("{}  {}", obs.date, obs.value);
                }
            }
        }
        Commands::Summary {
            metric_id,
            timeframe,
            formula,
            json,
        } => {
            let results = dw.summary(metric_id, &timeframe, &formula).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for r in &results {
                    match r.value {
                        Some(v) => println!("{:<24} {v}", r.label),
                        None => println!("{:<24} -", r.label),
                    }
                }
            }
        }
        Commands::Status => {
            let metrics = dw.list_metrics().await?;
            println!("Metrics: {}", metrics.len());
            for m in &metrics {
                let id = m.metric_id;
                let count: i64 = dw
                    .db()
                    .reader()
                    .call(move |conn| {
                        metricdw::storage::repository::data_point_count(conn, id)
                    })
                    .await?;
                println!("  {:>4}  {:<20} {count} data points", m.metric_id, m.name);
            }
        }
    }

    Ok(())
}
