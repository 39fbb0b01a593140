/// Diagnostic formatting: human-readable and JSON (NDJSON) modes.
///
/// This module implements two output strategies for
/// [`oifits_merge_core::MergeWarning`] values:
///
/// - **Human mode** (default): one line per warning, color-coded by
///   severity to stderr. Colors are disabled when `--no-color` is set, the
///   `NO_COLOR` environment variable is present (per <https://no-color.org>),
///   or stderr is not a TTY.
/// - **JSON mode**: each warning is serialized as a single-line JSON object
///   (NDJSON) to stderr.
///
/// Both modes support a **quiet** flag (suppress info-severity warnings).
use std::io::{IsTerminal as _, Write};

use oifits_merge_core::{MergeWarning, Severity};

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if ANSI color codes should be emitted to stderr.
///
/// Colors are disabled when any of the following conditions hold:
/// - `no_color_flag` is `true` (the `--no-color` CLI flag was passed).
/// - The `NO_COLOR` environment variable is present (any non-empty value).
/// - stderr is not a TTY (e.g. the output is piped to a file).
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

// ---------------------------------------------------------------------------
// ANSI escape sequences
// ---------------------------------------------------------------------------

const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// FormatterConfig
// ---------------------------------------------------------------------------

/// Configuration for the warning formatter, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether ANSI colors are enabled.
    pub colors: bool,
    /// Suppress info-severity warnings.
    pub quiet: bool,
}

impl FormatterConfig {
    /// Constructs a [`FormatterConfig`] from the raw CLI flags.
    pub fn from_flags(no_color_flag: bool, quiet: bool) -> Self {
        Self {
            colors: colors_enabled(no_color_flag),
            quiet,
        }
    }
}

// ---------------------------------------------------------------------------
// Output format selection
// ---------------------------------------------------------------------------

/// Output format selection, mirroring the CLI `--format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Human-readable, optionally colored output.
    Human,
    /// Structured NDJSON output.
    Json,
}

/// Writes a single [`MergeWarning`] to `writer` in the requested format.
///
/// In quiet mode, [`Severity::Info`] warnings are suppressed.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_warning<W: Write>(
    writer: &mut W,
    warning: &MergeWarning,
    mode: FormatMode,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet && matches!(warning.severity(), Severity::Info) {
        return Ok(());
    }

    match mode {
        FormatMode::Human => write_warning_human(writer, warning, config),
        FormatMode::Json => write_warning_json(writer, warning),
    }
}

fn write_warning_human<W: Write>(
    writer: &mut W,
    warning: &MergeWarning,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    let (tag, color) = match warning.severity() {
        Severity::Warning => ("[W]", ANSI_YELLOW),
        Severity::Info => ("[I]", ANSI_CYAN),
    };

    if config.colors {
        writeln!(writer, "{color}{tag}{ANSI_RESET} {warning}")
    } else {
        writeln!(writer, "{tag} {warning}")
    }
}

fn write_warning_json<W: Write>(writer: &mut W, warning: &MergeWarning) -> std::io::Result<()> {
    let severity_str = match warning.severity() {
        Severity::Warning => "warning",
        Severity::Info => "info",
    };
    let message_json = json_string(&warning.to_string());
    let severity_json = json_string(severity_str);
    writeln!(
        writer,
        r#"{{"severity":{severity_json},"message":{message_json}}}"#,
    )
}

/// Serializes `s` as a JSON string literal, escaping special characters.
fn json_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str(r#"\""#),
            '\\' => out.push_str(r"\\"),
            '\n' => out.push_str(r"\n"),
            '\r' => out.push_str(r"\r"),
            '\t' => out.push_str(r"\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
