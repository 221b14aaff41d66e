//! Output formatting and writing utilities
//!
//! Results are written as JSON, YAML or a human-readable layout. Human output
//! gets dedicated renderings for preview reports, validation reports and
//! mapping sets; machine formats serialize the same values unchanged.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use channelmap_core::{
    FieldMapping, PreviewReport, Severity, TypeWarning, ValidationIssue, ValidationReport,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, trace};

/// Formatting of command results in each output format
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a preview or rule test report
    fn format_preview_report(&self, report: &PreviewReport) -> Result<String>;

    /// Format a mapping-set validation report
    fn format_validation_report(&self, report: &ValidationReport) -> Result<String>;

    /// Format a mapping set
    fn format_mapping_set(&self, mappings: &[FieldMapping]) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    fn format_preview_report(&self, report: &PreviewReport) -> Result<String> {
        match self {
            OutputFormat::Human => format_preview_report_human(report),
            _ => self.format(report),
        }
    }

    fn format_validation_report(&self, report: &ValidationReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_validation_report_human(report)),
            _ => self.format(report),
        }
    }

    fn format_mapping_set(&self, mappings: &[FieldMapping]) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_mapping_set_human(mappings)),
            _ => self.format(&mappings),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && io::stdout().is_terminal(),
            quiet,
            verbose,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false,
            quiet,
            verbose,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Disable progress indicators regardless of the terminal
    pub fn disable_progress(&mut self) {
        self.show_progress = false;
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        if tracing::enabled!(tracing::Level::TRACE) {
            let logged = redaction::redacted(&serde_json::to_value(value)?);
            trace!(data = %logged, "Outputting data");
        }

        let formatted = self.format.format(value)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a preview or rule test report
    pub fn preview_report(&mut self, report: &PreviewReport) -> Result<()> {
        let formatted = self.format.format_preview_report(report)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a validation report
    pub fn validation_report(&mut self, report: &ValidationReport) -> Result<()> {
        let formatted = self.format.format_validation_report(report)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a mapping set
    pub fn mapping_set(&mut self, mappings: &[FieldMapping]) -> Result<()> {
        let formatted = self.format.format_mapping_set(mappings)?;
        self.writeln(formatted.trim_end())
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Some(style) = default_spinner_style() {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    /// Write a detail line, shown only with `-v`
    pub fn detail(&mut self, message: &str) -> Result<()> {
        if self.verbose == 0 || self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.dimmed().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a table (human format only)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        let rendered = render_table(headers, &rows);
        let mut lines = rendered.lines();
        if let Some(header) = lines.next() {
            if self.use_color {
                self.writeln(&header.bold().to_string())?;
            } else {
                self.writeln(header)?;
            }
        }
        for line in lines {
            self.writeln(line)?;
        }
        Ok(())
    }
}

/// Spinner style; `None` if the template is rejected
pub fn default_spinner_style() -> Option<ProgressStyle> {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .ok()
}

/// Lay out rows under headers with `│` separators
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let pad = |text: &str, width: usize| {
        let fill = width.saturating_sub(text.chars().count());
        format!("{}{}", text, " ".repeat(fill))
    };

    let mut out = String::new();
    let header = headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad(h, widths[i]))
        .collect::<Vec<_>>()
        .join(" │ ");
    out.push_str(header.trim_end());
    out.push('\n');

    let separator = widths
        .iter()
        .map(|w| "─".repeat(*w))
        .collect::<Vec<_>>()
        .join("─┼─");
    out.push_str(&separator);
    out.push('\n');

    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| match widths.get(i) {
                Some(width) => pad(cell, *width),
                None => cell.clone(),
            })
            .collect::<Vec<_>>()
            .join(" │ ");
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn format_preview_report_human(report: &PreviewReport) -> Result<String> {
    let mut output = String::new();

    output.push_str("═══ Mapped Document ═══\n");
    output.push_str(&serde_json::to_string_pretty(&report.output)?);
    output.push_str("\n\n");

    if report.errors.is_empty() {
        output.push_str("✅ All mappings applied\n");
    } else {
        output.push_str(&format!("❌ {} Field Error(s)\n", report.errors.len()));
        let rows: Vec<Vec<String>> = report
            .errors
            .iter()
            .map(|e| {
                vec![
                    e.channel_field.clone(),
                    e.internal_field.clone(),
                    e.error.kind().to_string(),
                    e.error.to_string(),
                ]
            })
            .collect();
        output.push_str(&render_table(&["Channel Field", "Internal Field", "Kind", "Message"], &rows));
    }

    if !report.type_warnings.is_empty() {
        output.push('\n');
        output.push_str(&format_type_warnings_human(&report.type_warnings));
    }

    Ok(output)
}

fn format_type_warnings_human(warnings: &[TypeWarning]) -> String {
    let mut output = format!("⚠️ {} Type Warning(s)\n", warnings.len());
    for warning in warnings {
        output.push_str(&format!(
            "  • {}: expected {}, got {}\n",
            warning.channel_field, warning.expected, warning.actual
        ));
    }
    output
}

fn format_validation_report_human(report: &ValidationReport) -> String {
    let mut output = String::new();
    let errors = report.errors().count();
    let warnings = report.warnings().count();

    if errors == 0 {
        output.push_str(&format!("✅ Mapping set is valid ({} warning(s))\n", warnings));
    } else {
        output.push_str(&format!(
            "❌ Validation Failed - {} Error(s), {} Warning(s)\n",
            errors, warnings
        ));
    }

    for severity in [Severity::Error, Severity::Warning, Severity::Info] {
        let issues: Vec<&ValidationIssue> = report.with_severity(severity).collect();
        if issues.is_empty() {
            continue;
        }
        output.push('\n');
        output.push_str(&format!("{} {} Issues:\n", severity_icon(severity), capitalize(severity)));
        for issue in issues {
            output.push_str(&format!("  📍 {}\n", issue.field_path));
            output.push_str(&format!("     {}\n", issue.message));
            if let Some(expected) = &issue.expected {
                output.push_str(&format!("     Expected: {}\n", expected));
            }
            if let Some(actual) = &issue.actual {
                output.push_str(&format!("     Actual: {}\n", actual));
            }
        }
    }

    output
}

fn format_mapping_set_human(mappings: &[FieldMapping]) -> String {
    if mappings.is_empty() {
        return "No mappings configured\n".to_string();
    }

    let rows: Vec<Vec<String>> = mappings
        .iter()
        .map(|m| {
            vec![
                m.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
                m.channel_field.clone(),
                m.internal_field.clone(),
                m.field_type.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
                if m.is_required { "yes" } else { "no" }.to_string(),
                m.transform_rule
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    render_table(
        &["ID", "Channel Field", "Internal Field", "Type", "Required", "Rule"],
        &rows,
    )
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "❌",
        Severity::Warning => "⚠️",
        Severity::Info => "ℹ️",
    }
}

fn capitalize(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "Error",
        Severity::Warning => "Warning",
        Severity::Info => "Info",
    }
}

/// Format a JSON value in a compact, human-readable way
pub fn format_value_compact(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            if arr.len() <= 3 {
                format!(
                    "[{}]",
                    arr.iter().map(format_value_compact).collect::<Vec<_>>().join(", ")
                )
            } else {
                format!("[{} items]", arr.len())
            }
        }
        Value::Object(obj) => {
            if obj.len() <= 2 {
                let items: Vec<String> = obj
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, format_value_compact(v)))
                    .collect();
                format!("{{{}}}", items.join(", "))
            } else {
                format!("{{{} fields}}", obj.len())
            }
        }
    }
}
