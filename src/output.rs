// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON-lines output modes.

use serde::Serialize;
use std::time::Instant;

use crate::config::EnvironmentCatalog;
use crate::diagnostics::Warning;
use crate::history::DeploymentRecord;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => emit(&JsonEvent {
                event: "success",
                message,
                duration_secs: self.duration(),
            }),
        }
    }

    /// Print a warning (suppressed in quiet mode).
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => emit(&JsonEvent {
                event: "warning",
                message,
                duration_secs: None,
            }),
        }
    }

    pub fn warnings(&self, warnings: &[Warning]) {
        for warning in warnings {
            self.warning(&warning.to_string());
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print one history record.
    pub fn record(&self, record: &DeploymentRecord) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => println!("{}", record_line(record)),
            OutputMode::Json => emit(&JsonRecord {
                event: "record",
                record,
            }),
        }
    }

    /// Print history records, newest first.
    pub fn records(&self, records: &[DeploymentRecord]) {
        if records.is_empty() {
            self.progress("No deployments recorded");
            return;
        }
        if self.mode == OutputMode::Normal {
            println!(
                "{:<28} {:<16} {:<12} {:<20} STATUS",
                "TIMESTAMP", "APP", "ENV", "VERSION"
            );
        }
        for record in records {
            self.record(record);
        }
    }

    /// Print the environment catalog.
    pub fn environments(&self, catalog: &EnvironmentCatalog) {
        for (name, info) in &catalog.environments {
            match self.mode {
                OutputMode::Normal => match &info.description {
                    Some(description) => println!("{name:<12} {description}"),
                    None => println!("{name}"),
                },
                OutputMode::Quiet => println!("{name}"),
                OutputMode::Json => emit(&JsonEnvironment {
                    event: "environment",
                    name,
                    description: info.description.as_deref(),
                }),
            }
        }
    }
}

fn record_line(record: &DeploymentRecord) -> String {
    format!(
        "{:<28} {:<16} {:<12} {:<20} {}",
        record.timestamp_str(),
        record.app().as_str(),
        record.env().as_str(),
        record.version(),
        record.status()
    )
}

fn emit<T: Serialize>(event: &T) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    event: &'a str,
    #[serde(flatten)]
    record: &'a DeploymentRecord,
}

#[derive(Serialize)]
struct JsonEnvironment<'a> {
    event: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}
