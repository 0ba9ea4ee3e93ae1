//! Plain-text rendering of scan reports and build summaries.

use std::fmt::Write;

use clauseguard_core::{BuildSummary, RiskFinding};
use clauseguard_scan::ScanReport;

const RULE: &str = "────────────────────────────────────────────────────────────";

/// Longest rewrite preview shown in the terminal report.
const REWRITE_PREVIEW_CHARS: usize = 160;

/// Render a scan report as a sequence of finding cards plus a summary line.
pub fn render_report(report: &ScanReport, document: &str, threshold: f32) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Scanned {document}: {} clauses analyzed, {} skipped (threshold {threshold})",
        report.clauses_scanned, report.clauses_skipped
    );
    let _ = writeln!(out, "{RULE}");

    for (number, finding) in report.findings.iter().enumerate() {
        render_finding(&mut out, number + 1, finding);
        let _ = writeln!(out, "{RULE}");
    }

    if report.findings.is_empty() {
        let _ = writeln!(out, "No deviations detected. Document aligns with the safe-clause standard.");
    } else {
        let _ = writeln!(
            out,
            "Found {} deviation{} from the safe-clause standard.",
            report.findings.len(),
            if report.findings.len() == 1 { "" } else { "s" }
        );
    }
    out
}

fn render_finding(out: &mut String, number: usize, finding: &RiskFinding) {
    let _ = writeln!(out, "RISK {number}  {}", finding.category);
    let _ = writeln!(out, "  deviation  {:.2}%", finding.deviation_score);
    let _ = writeln!(out, "  clause     \"{}\"", finding.clause_text);
    let _ = writeln!(
        out,
        "  rewrite    \"{}\"",
        truncate(&finding.safe_rewrite, REWRITE_PREVIEW_CHARS)
    );
}

/// Render build accounting for operator inspection.
pub fn render_build_summary(summary: &BuildSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Indexed {} clause records", summary.indexed);
    let _ = writeln!(out, "  join misses          {}", summary.join_misses);
    let _ = writeln!(out, "  duplicate safe ids   {}", summary.duplicate_safe_ids);
    let _ = writeln!(out, "  duplicate risky ids  {}", summary.duplicate_risky_ids);
    out
}

/// Char-safe truncation with an ellipsis marker.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max_chars).collect();
    shortened.push_str("...");
    shortened
}
