//! Output formatting for the CLI
//!
//! Human mode prints colored task lines and a recap to stdout; JSON mode
//! prints one JSON object per line. Errors and warnings go to stderr in
//! both modes.

use colored::Colorize;
use std::time::{Duration, Instant};

use transcoder_iac::executor::{Recap, TaskOutcome};
use transcoder_iac::modules::{Diff, ModuleStatus};

/// Colored label for a task status.
fn colored_status(status: ModuleStatus) -> String {
    match status {
        ModuleStatus::Ok => "ok".green().to_string(),
        ModuleStatus::Changed => "changed".yellow().to_string(),
        ModuleStatus::Skipped => "skipping".cyan().to_string(),
        ModuleStatus::Failed => "failed".red().bold().to_string(),
    }
}

fn plain_status(status: ModuleStatus) -> &'static str {
    match status {
        ModuleStatus::Ok => "ok",
        ModuleStatus::Changed => "changed",
        ModuleStatus::Skipped => "skipping",
        ModuleStatus::Failed => "failed",
    }
}

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// JSON output mode
    json_mode: bool,
    /// Verbosity level
    verbosity: u8,
    /// Start time for duration calculations
    start_time: Instant,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, json_mode: bool, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var_os("NO_COLOR").is_none();

        Self {
            use_color,
            json_mode,
            verbosity,
            start_time: Instant::now(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.json_mode
    }

    /// Print a banner/header
    pub fn banner(&self, title: &str) {
        if self.json_mode {
            return;
        }

        let line = "=".repeat(title.len() + 4);
        if self.use_color {
            println!("\n{}", line.bright_blue());
            println!("{}", format!("  {}  ", title).bright_blue().bold());
            println!("{}\n", line.bright_blue());
        } else {
            println!("\n{}", line);
            println!("  {}  ", title);
            println!("{}\n", line);
        }
    }

    /// Print the result of one task, with its diff when one was produced
    pub fn task_result(&self, outcome: &TaskOutcome) {
        let status = outcome.status();

        if self.json_mode {
            let result = match &outcome.result {
                Ok(output) => serde_json::json!({
                    "task": outcome.name,
                    "module": outcome.module,
                    "status": plain_status(status),
                    "output": output,
                }),
                Err(e) => serde_json::json!({
                    "task": outcome.name,
                    "module": outcome.module,
                    "status": plain_status(status),
                    "error": e.to_string(),
                }),
            };
            println!("{}", result);
            return;
        }

        let status_str = if self.use_color {
            colored_status(status)
        } else {
            plain_status(status).to_string()
        };
        let name_str = if self.use_color {
            outcome.name.bright_white().bold().to_string()
        } else {
            outcome.name.clone()
        };

        let message = match &outcome.result {
            Ok(output) => output.msg.clone(),
            Err(e) => e.to_string(),
        };
        println!("{}: [{}] => {}", status_str, name_str, message);

        if let Ok(output) = &outcome.result {
            if let Some(diff) = &output.diff {
                self.diff(diff);
            }
            if self.verbosity >= 1 && !output.data.is_empty() {
                for (key, value) in &output.data {
                    if self.use_color {
                        println!("    {}: {}", key.bright_black(), value);
                    } else {
                        println!("    {}: {}", key, value);
                    }
                }
            }
        }
    }

    /// Print a before/after diff
    pub fn diff(&self, diff: &Diff) {
        if self.json_mode {
            return;
        }

        if let Some(details) = &diff.details {
            if self.use_color {
                println!("  {}", details.bright_black());
            } else {
                println!("  {}", details);
            }
        }
        for line in diff.before.lines() {
            if self.use_color {
                println!("{}", format!("- {}", line).red());
            } else {
                println!("- {}", line);
            }
        }
        for line in diff.after.lines() {
            if self.use_color {
                println!("{}", format!("+ {}", line).green());
            } else {
                println!("+ {}", line);
            }
        }
    }

    /// Print a recap summary
    pub fn recap(&self, recap: &Recap) {
        if self.json_mode {
            let summary = serde_json::json!({
                "type": "recap",
                "ok": recap.ok,
                "changed": recap.changed,
                "failed": recap.failed,
                "skipped": recap.skipped,
            });
            println!("{}", summary);
            return;
        }

        let header = "RECAP";
        let stars = "*".repeat(80 - header.len());

        if self.use_color {
            println!("\n{} {}", header.bright_white().bold(), stars.bright_black());

            let fmt_stat = |label: &str, value: usize, color: colored::Color| -> String {
                if value > 0 {
                    format!("{}={:<4}", label.color(color), value)
                } else {
                    format!("{}={:<4}", label, value).dimmed().to_string()
                }
            };
            println!(
                "{} {} {} {}",
                fmt_stat("ok", recap.ok, colored::Color::Green),
                fmt_stat("changed", recap.changed, colored::Color::Yellow),
                fmt_stat("failed", recap.failed, colored::Color::Red),
                fmt_stat("skipped", recap.skipped, colored::Color::Cyan),
            );
        } else {
            println!("\n{} {}", header, stars);
            println!(
                "ok={:<4} changed={:<4} failed={:<4} skipped={:<4}",
                recap.ok, recap.changed, recap.failed, recap.skipped
            );
        }

        let duration_str = format_duration(self.start_time.elapsed());
        if self.use_color {
            println!("\n{} {}", "Run took".bright_black(), duration_str.bright_white());
            if recap.has_failures() {
                println!("{}", "Run failed.".red().bold());
            } else {
                println!("{}", "Run completed successfully.".green().bold());
            }
        } else {
            println!("\nRun took {}", duration_str);
            if recap.has_failures() {
                println!("Run failed.");
            } else {
                println!("Run completed successfully.");
            }
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.json_mode {
            let err = serde_json::json!({
                "type": "error",
                "message": message
            });
            eprintln!("{}", err);
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.json_mode {
            let warn = serde_json::json!({
                "type": "warning",
                "message": message
            });
            eprintln!("{}", warn);
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print an info message (respects verbosity)
    pub fn info(&self, message: &str) {
        if self.json_mode || self.verbosity < 1 {
            return;
        }

        if self.use_color {
            println!("{} {}", "INFO:".blue(), message);
        } else {
            println!("INFO: {}", message);
        }
    }

    /// Print a success line
    pub fn success(&self, message: &str) {
        if self.json_mode {
            let ok = serde_json::json!({
                "type": "success",
                "message": message
            });
            println!("{}", ok);
            return;
        }

        if self.use_color {
            println!("{}", message.green().bold());
        } else {
            println!("{}", message);
        }
    }
}

/// Format a duration for display
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
