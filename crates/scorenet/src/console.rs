//! Colorful console output for network and session events.
//!
//! Provides a custom `tracing` layer that formats scorenet events with colors.
//!
//! ## Log Levels
//!
//! - **WARN**: Constraints disabled by a zero weight
//! - **ERROR**: Sessions corrupted by a failed flush
//! - **DEBUG**: Network builds and closed sessions
//! - **TRACE**: Every flush with its propagation counts

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect.
/// `RUST_LOG` overrides the default `scorenet_scoring=info` filter.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
            .add_directive(
                "scorenet_scoring=info"
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into()),
            );

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(ScoreNetConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that formats scorenet events with colors.
pub struct ScoreNetConsoleLayer;

impl<S: Subscriber> Layer<S> for ScoreNetConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("scorenet") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(*metadata.level(), &visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stderr(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    constraint: Option<String>,
    error: Option<String>,
    constraints: Option<u64>,
    nodes: Option<u64>,
    shared: Option<u64>,
    layers: Option<u64>,
    node_sharing: Option<bool>,
    inserts: Option<u64>,
    updates: Option<u64>,
    retracts: Option<u64>,
    visited: Option<u64>,
    tuples: Option<u64>,
    facts: Option<u64>,
}

impl EventVisitor {
    fn record_text(&mut self, field: &Field, value: String) {
        match field.name() {
            "event" => self.event = Some(value),
            "message" => self.message = Some(value),
            "constraint" => self.constraint = Some(value),
            "error" => self.error = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_text(field, format!("{:?}", value).trim_matches('"').to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "constraints" => self.constraints = Some(value),
            "nodes" => self.nodes = Some(value),
            "shared" => self.shared = Some(value),
            "layers" => self.layers = Some(value),
            "inserts" => self.inserts = Some(value),
            "updates" => self.updates = Some(value),
            "retracts" => self.retracts = Some(value),
            "visited" => self.visited = Some(value),
            "tuples" => self.tuples = Some(value),
            "facts" => self.facts = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "node_sharing" {
            self.node_sharing = Some(value);
        }
    }
}

fn format_event(level: Level, v: &EventVisitor) -> String {
    let body = match v.event.as_deref() {
        Some("network_built") => format_network_built(v),
        Some("constraint_disabled") => format_constraint_disabled(v),
        Some("flush") => format_flush(v),
        Some("session_corrupted") => format_session_corrupted(v),
        Some("session_closed") => format_session_closed(v),
        _ => match &v.message {
            Some(message) => message.clone(),
            None => return String::new(),
        },
    };

    format!("{} {} {}", timestamp().bright_black(), format_level(level), body)
}

fn format_level(level: Level) -> String {
    match level {
        Level::ERROR => "ERROR".bright_red().bold().to_string(),
        Level::WARN => " WARN".yellow().to_string(),
        Level::INFO => " INFO".bright_green().to_string(),
        Level::DEBUG => "DEBUG".bright_blue().to_string(),
        Level::TRACE => "TRACE".bright_black().to_string(),
    }
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_network_built(v: &EventVisitor) -> String {
    let sharing = if v.node_sharing.unwrap_or(true) {
        "on".bright_green().to_string()
    } else {
        "off".yellow().to_string()
    };

    format!(
        "{} network built: constraints ({}), nodes ({}), shared ({}), layers ({}), node sharing ({})",
        "[Network]".bright_cyan(),
        count(v.constraints).bright_yellow(),
        count(v.nodes).bright_yellow(),
        count(v.shared).bright_magenta(),
        count(v.layers).white(),
        sharing
    )
}

fn format_constraint_disabled(v: &EventVisitor) -> String {
    format!(
        "{} constraint {} has a zero weight and is not built",
        "[Network]".bright_cyan(),
        v.constraint.as_deref().unwrap_or("?").white().bold()
    )
}

fn format_flush(v: &EventVisitor) -> String {
    format!(
        "{} flush: +{} ~{} -{} over {} nodes, {} tuples live",
        "[Session]".bright_cyan(),
        count(v.inserts).bright_green(),
        count(v.updates).yellow(),
        count(v.retracts).bright_red(),
        count(v.visited).white(),
        count(v.tuples).white()
    )
}

fn format_session_corrupted(v: &EventVisitor) -> String {
    format!(
        "{} session corrupted: {}",
        "[Session]".bright_cyan(),
        v.error.as_deref().unwrap_or("unknown error").bright_red()
    )
}

fn format_session_closed(v: &EventVisitor) -> String {
    format!(
        "{} session closed: facts ({}), tuples ({})",
        "[Session]".bright_cyan(),
        count(v.facts).white(),
        count(v.tuples).white()
    )
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
}
