use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use carbon_core::{
    load_dashboard_config_from_env, DashboardConfig, DashboardContext, Dataset, InteractionEvent,
};
use carbon_proto::{ClientEvent, DashboardFrame};
use clap::Parser;
use serde_json::{json, Value as JsonValue};

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay dashboard interactions offline", long_about = None)]
struct Args {
    /// Dataset CSV
    #[arg(long, default_value = "data/carbon.csv")]
    data: PathBuf,

    /// Dashboard config JSON (defaults to CARBON_DASHBOARD_CONFIG_PATH, then builtin)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file holding an array of client events, applied before --event entries
    #[arg(long)]
    script: Option<PathBuf>,

    /// Event to apply: hover=<country>, leave, tick, or tick*<count>
    #[arg(long = "event")]
    events: Vec<String>,

    /// Show full percentages at once instead of animating the fill
    #[arg(long = "static")]
    static_fill: bool,

    /// Print complete frames instead of summaries
    #[arg(long)]
    full: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("Failed to load config at {}", path.display()))?,
        None => {
            load_dashboard_config_from_env()
                .with_context(|| "Failed to load dashboard config from environment")?
                .0
        }
    };
    if args.static_fill {
        config.set_animate_progress(false);
    }

    let dataset = Dataset::from_file(&args.data)
        .with_context(|| format!("Failed to load dataset at {}", args.data.display()))?;
    let context = Arc::new(
        DashboardContext::new(config, dataset).with_context(|| "Dashboard config is inconsistent")?,
    );

    let mut events = match &args.script {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };
    for raw in &args.events {
        events.extend(parse_event(raw)?);
    }

    let mut session = context.open_session();
    let initial = session
        .initial_frame()
        .with_context(|| "Failed to project initial frame")?;
    println!("=== initial ===");
    print_frame(&initial, args.full)?;

    for (step, event) in events.into_iter().enumerate() {
        let label = describe(&event);
        let frame = session
            .handle(InteractionEvent::from(event))
            .with_context(|| format!("Step {} ({}) failed", step, label))?;
        if let Some(frame) = frame {
            println!("=== step {} {} ===", step, label);
            print_frame(&frame, args.full)?;
        }
    }

    let metrics = session.close();
    println!("=== metrics ===");
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "events": metrics.events_processed,
            "hovers": metrics.hovers,
            "ticks": metrics.timer_ticks,
            "ignored_hovers": metrics.ignored_hovers,
            "saturated_ticks": metrics.saturated_ticks,
            "frames": metrics.frames_emitted,
        }))?
    );

    Ok(())
}

fn load_script(path: &Path) -> Result<Vec<ClientEvent>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse script JSON {}", path.display()))
}

fn parse_event(raw: &str) -> Result<Vec<ClientEvent>> {
    if let Some(country) = raw.strip_prefix("hover=") {
        if country.is_empty() {
            return Ok(vec![ClientEvent::leave()]);
        }
        return Ok(vec![ClientEvent::hover(country)]);
    }
    if raw == "leave" {
        return Ok(vec![ClientEvent::leave()]);
    }
    if raw == "tick" {
        return Ok(vec![ClientEvent::Tick]);
    }
    if let Some(count) = raw.strip_prefix("tick*") {
        let count: usize = count
            .parse()
            .with_context(|| format!("Invalid tick count in '{}'", raw))?;
        return Ok(vec![ClientEvent::Tick; count]);
    }
    Err(anyhow::anyhow!(
        "Event '{}' must be hover=<country>, leave, tick, or tick*<count>",
        raw
    ))
}

fn describe(event: &ClientEvent) -> String {
    match event {
        ClientEvent::Hover {
            country: Some(country),
        } => format!("hover={}", country),
        ClientEvent::Hover { country: None } => "leave".to_string(),
        ClientEvent::Tick => "tick".to_string(),
    }
}

fn print_frame(frame: &DashboardFrame, full: bool) -> Result<()> {
    let value: JsonValue = if full {
        serde_json::to_value(frame)?
    } else {
        json!({
            "sequence": frame.sequence,
            "country": frame.selection.country,
            "progress_ticks": frame.selection.progress_ticks,
            "fallback": frame.selection.fallback,
            "low_carbon": frame.low_carbon.annotation_text(),
            "renewable": frame.renewable.annotation_text(),
        })
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
