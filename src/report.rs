//! Rendering of run summaries into ordered, leveled report sections.
//!
//! Rendering is pure: the same summary always yields the same sections, and
//! the caller decides where the lines go (see [`crate::log::RunLog`]).
//!
//! # Section Order
//!
//! ```text
//! RUN SUMMARY                     always
//! RUN CHANGES                     when changes were recorded
//! RUN WARNINGS                    when warnings were recorded
//! RUN COMPLETED                   no failed rows
//! RUN FAILURES                    otherwise, followed by
//! RUN COMPLETED WITH FAILURES
//! ```
use crate::log::Severity;
use crate::orchestrator::RunFault;
use crate::summary::{RowMessage, RunSummary};

/// Identifies a report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Summary,
    Changes,
    Warnings,
    Completed,
    Failures,
    Fault,
    CompletedWithFailures,
}

impl SectionKind {
    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Summary => "RUN SUMMARY",
            SectionKind::Changes => "RUN CHANGES",
            SectionKind::Warnings => "RUN WARNINGS",
            SectionKind::Completed => "RUN COMPLETED",
            SectionKind::Failures => "RUN FAILURES",
            SectionKind::Fault => "RUN FAULT",
            SectionKind::CompletedWithFailures => "RUN COMPLETED WITH FAILURES",
        }
    }
}

/// One rendered section: a banner line followed by its body lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub kind: SectionKind,
    pub severity: Severity,
    pub body: Vec<String>,
}

impl ReportSection {
    fn new(kind: SectionKind, severity: Severity) -> Self {
        Self {
            kind,
            severity,
            body: Vec::new(),
        }
    }

    fn push(&mut self, line: impl Into<String>) {
        self.body.push(line.into());
    }

    pub fn banner(&self) -> String {
        format!("--- {} ---", self.kind.title())
    }

    /// Banner plus body, in emission order.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.banner()).chain(self.body.iter().cloned())
    }
}

/// Render a finalized summary.
pub fn render(summary: &RunSummary) -> Vec<ReportSection> {
    let mut sections = Vec::new();

    let mut header = ReportSection::new(SectionKind::Summary, Severity::Info);
    header.push(format!("Processed {} rows", summary.total_rows));
    header.push(format!(
        "Number of rows succeeded: {}",
        summary.success_rows
    ));
    sections.push(header);

    if !summary.changes.is_empty() {
        let mut changes = ReportSection::new(SectionKind::Changes, Severity::Info);
        push_entries(&mut changes, &summary.changes);
        sections.push(changes);
    }

    if !summary.warnings.is_empty() {
        // Banner shares the entries' level so filtering at warn keeps it.
        let mut warnings = ReportSection::new(SectionKind::Warnings, Severity::Warning);
        push_entries(&mut warnings, &summary.warnings);
        sections.push(warnings);
    }

    if summary.fail_rows == 0 {
        sections.push(ReportSection::new(SectionKind::Completed, Severity::Info));
        return sections;
    }

    let mut failures = ReportSection::new(SectionKind::Failures, Severity::Error);
    failures.push(format!("Number of rows failed: {}", summary.fail_rows));
    // BTreeSet iterates ascending and deduplicated.
    let rows: Vec<String> = summary.fail_index.iter().map(usize::to_string).collect();
    failures.push(format!("Please check rows: [{}]", rows.join(", ")));
    push_entries(&mut failures, &summary.errors);
    sections.push(failures);
    sections.push(completed_with_failures());
    sections
}

/// Render the report for a run that faulted before producing a summary.
pub fn render_fault(fault: &RunFault) -> Vec<ReportSection> {
    let mut section = ReportSection::new(SectionKind::Fault, Severity::Error);
    section.push(format!(
        "Run failed while {}: {}",
        fault.stage, fault.message
    ));
    if !fault.trace.is_empty() {
        section.push(fault.trace.clone());
    }
    vec![section, completed_with_failures()]
}

fn completed_with_failures() -> ReportSection {
    ReportSection::new(SectionKind::CompletedWithFailures, Severity::Error)
}

fn push_entries(section: &mut ReportSection, entries: &[RowMessage]) {
    for entry in sorted_by_index(entries) {
        section.push(format!("Row: {}\nMessage: {}", entry.index, entry.message));
    }
}

/// Sort by row index; `sort_by_key` is stable so duplicates keep recording order.
fn sorted_by_index(entries: &[RowMessage]) -> Vec<&RowMessage> {
    let mut sorted: Vec<&RowMessage> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.index);
    sorted
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
