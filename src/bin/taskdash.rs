use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use taskdash::{
    Client, Dashboard, DailyCompletionSeries, ProductivityIndicators, StatusSummary, TaskDash,
};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Parser)]
#[command(name = "taskdash", about = "Task-list dashboard metrics CLI")]
struct Cli {
    /// Base URL of the task-list API (default: $TASKDASH_BASE_URL or http://127.0.0.1:8000)
    #[arg(long)]
    base_url: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full dashboard: status, completions, tags, productivity
    Dashboard {
        /// Reporting date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        as_of: Option<String>,
        /// Number of top tags to show
        #[arg(long, default_value = "6")]
        top: usize,
        /// Include tags no task references
        #[arg(long)]
        include_unused: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Status distribution and completion rate
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Daily completion trend
    Daily {
        /// Most recent N days with activity
        #[arg(long, default_value = "7")]
        days: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Tag usage ranking
    Tags {
        /// Number of top tags to show
        #[arg(long, default_value = "6")]
        top: usize,
        /// Include tags no task references
        #[arg(long)]
        include_unused: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Productivity indicators
    Productivity {
        /// Reporting date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        as_of: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
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

    let base_url = cli
        .base_url
        .or_else(|| std::env::var("TASKDASH_BASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let dash = TaskDash::new(Client::new(&base_url)?);

    match cli.command {
        Commands::Dashboard {
            as_of,
            top,
            include_unused,
            json,
        } => {
            let now = resolve_as_of(as_of.as_deref())?;
            let d = dash.dashboard(now, include_unused).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&d)?);
            } else {
                print_dashboard(&d, now, top);
            }
        }
        Commands::Status { json } => {
            let summary = dash.status_summary().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_status_summary(&summary);
            }
        }
        Commands::Daily { days, json } => {
            let series = dash.daily_completions().await?;
            let recent = series.recent_active_days(days);
            if json {
                println!("{}", serde_json::to_string_pretty(&recent)?);
            } else {
                print_daily(&recent);
            }
        }
        Commands::Tags {
            top,
            include_unused,
            json,
        } => {
            let ranking = dash.tag_ranking(include_unused).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ranking.top(top))?);
            } else {
                print_tags(ranking.top(top));
            }
        }
        Commands::Productivity { as_of, json } => {
            let now = resolve_as_of(as_of.as_deref())?;
            let p = dash.productivity(now).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&p)?);
            } else {
                print_productivity(&p);
            }
        }
    }

    Ok(())
}

/// Resolve the reporting instant once, up front. `--as-of` pins it to
/// midday UTC of the given date for reproducible output.
fn resolve_as_of(as_of: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match as_of {
        Some(s) => {
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| anyhow::anyhow!("invalid --as-of date: {s} (expected YYYY-MM-DD)"))?;
            Ok(taskdash::date_util::noon_utc(date))
        }
        None => Ok(Utc::now()),
    }
}

fn print_dashboard(d: &Dashboard, now: DateTime<Utc>, top: usize) {
    println!("Dashboard (as of {})", now.date_naive());
    print_status_summary(&d.status);
    print_productivity(&d.productivity);
    println!("Completions (recent active days):");
    let recent = d.daily_completions.recent_active_days(7);
    if recent.is_empty() {
        println!("  none");
    } else {
        for (date, count) in recent.iter() {
            println!("  {date}  {count}");
        }
    }
    println!("Top tags:");
    if d.top_tags.is_empty() {
        println!("  none");
    } else {
        print_tag_rows(d.top_tags.top(top));
    }
}

fn print_status_summary(s: &StatusSummary) {
    println!("Tasks:");
    println!("  Total:       {}", s.total());
    println!("  Pending:     {}", s.pending);
    println!("  In progress: {}", s.in_progress);
    println!("  Completed:   {}", s.completed);
    println!("  Completion:  {}%", s.completion_rate());
}

fn print_daily(series: &DailyCompletionSeries) {
    if series.is_empty() {
        println!("No completed tasks.");
        return;
    }
    for (date, count) in series.iter() {
        println!("{date}  {count}");
    }
}

fn print_tags(entries: &[taskdash::TagUsage]) {
    if entries.is_empty() {
        println!("No tags in use.");
        return;
    }
    print_tag_rows(entries);
}

fn print_tag_rows(entries: &[taskdash::TagUsage]) {
    let width = entries
        .iter()
        .map(|e| e.name.as_str().len())
        .max()
        .unwrap_or(0);
    for entry in entries {
        println!("  {:width$}  {}", entry.name, entry.count);
    }
}

fn print_productivity(p: &ProductivityIndicators) {
    println!("Productivity:");
    match p.average_completion_days {
        Some(days) => println!("  Avg completion: {days} days"),
        None => println!("  Avg completion: unknown (no completed tasks with timestamps)"),
    }
    println!("  Created today:  {}", p.created_today);
    println!("  Weekly rate:    {}%", p.weekly_completion_rate);
    if p.completed_without_timestamp > 0 {
        println!(
            "  Note: {} completed task(s) lack a completion timestamp",
            p.completed_without_timestamp
        );
    }
}
