//! Text and JSON renderings of reports.
//!
//! The text layout is scraped by scripts: buckets in the order error, in
//! sync, needs commit, needs sync; one line per outcome made of a marker, the
//! identifier padded to [`IDENTIFIER_WIDTH`] columns, a space and the detail.

use std::fmt::Write as _;

use colored::{Color, Colorize};
use gitall_api::{OutcomeKind, ReconciliationOutcome, ReconciliationReport};

use crate::Whereabouts;

/// Column width the identifier is padded to.
pub const IDENTIFIER_WIDTH: usize = 40;
/// Column width of the path in whereabouts listings.
pub const WHEREABOUTS_WIDTH: usize = 20;

/// Presentation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit ANSI colors.
    pub color: bool,
}

/// Marker printed in front of each outcome.
#[must_use]
pub const fn marker(kind: OutcomeKind) -> &'static str {
    match kind {
        OutcomeKind::RepoError => " x  ",
        OutcomeKind::InSync => " \u{2714}  ",
        OutcomeKind::NeedsCommit => " +  ",
        OutcomeKind::NeedsSync => "<-> ",
    }
}

const fn color(kind: OutcomeKind) -> Color {
    match kind {
        OutcomeKind::RepoError => Color::Red,
        OutcomeKind::InSync => Color::Green,
        OutcomeKind::NeedsCommit => Color::Magenta,
        OutcomeKind::NeedsSync => Color::Yellow,
    }
}

/// Render the report as text, one line per outcome.
#[must_use]
pub fn render_report(report: &ReconciliationReport, options: RenderOptions) -> String {
    let mut out = String::new();
    for kind in OutcomeKind::DISPLAY_ORDER {
        for outcome in report.bucket(kind) {
            render_outcome(&mut out, outcome, options);
        }
    }
    out
}

fn render_outcome(out: &mut String, outcome: &ReconciliationOutcome, options: RenderOptions) {
    let kind = outcome.kind;
    let identifier = format!("{:<width$}", outcome.identifier(), width = IDENTIFIER_WIDTH);

    if options.color {
        // Error details are left uncolored so long transport messages stay readable.
        let detail = if kind == OutcomeKind::RepoError {
            outcome.detail.normal()
        } else {
            outcome.detail.color(color(kind))
        };
        let _ = writeln!(out, "{}{identifier} {detail}", marker(kind).color(color(kind)));
    } else {
        let _ = writeln!(out, "{}{identifier} {}", marker(kind), outcome.detail);
    }

    for note in &outcome.notes {
        let _ = writeln!(out, "{:4}{:<width$} - {note}", "", "", width = IDENTIFIER_WIDTH);
    }
}

/// Render the report as pretty-printed JSON.
///
/// # Errors
///
/// Propagates serialization failures.
pub fn render_json(report: &ReconciliationReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Render a whereabouts listing, one repository per line.
#[must_use]
pub fn render_whereabouts(entries: &[Whereabouts], options: RenderOptions) -> String {
    let mut out = String::new();
    for entry in entries {
        let path = format!("{:>width$}", entry.path(), width = WHEREABOUTS_WIDTH);
        let detail = match entry {
            Whereabouts::Located {
                branch, remote_url, ..
            } => {
                let text = format!("{} of {remote_url}", branch.as_deref().unwrap_or("(detached)"));
                if options.color {
                    text.green().to_string()
                } else {
                    text
                }
            }
            Whereabouts::Failed { detail, .. } => {
                if options.color {
                    detail.red().to_string()
                } else {
                    detail.clone()
                }
            }
        };
        let _ = writeln!(out, "{path} {detail}");
    }
    out
}
