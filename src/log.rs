//! Leveled logging capability injected into the orchestrator.
//!
//! The run core only needs three levels. Production runs forward to `tracing`
//! so the subscriber installed in `main` decides formatting and filtering.
/// Severity a report line is emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Sink for run progress and report lines.
pub trait RunLog {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => self.info(message),
            Severity::Warning => self.warn(message),
            Severity::Error => self.error(message),
        }
    }
}

/// Forwards run log lines to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl RunLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Captures log lines in memory for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryLog {
    lines: std::cell::RefCell<Vec<(Severity, String)>>,
}

#[cfg(test)]
impl MemoryLog {
    pub(crate) fn lines(&self) -> Vec<(Severity, String)> {
        self.lines.borrow().clone()
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub(crate) fn contains(&self, needle: &str) -> bool {
        self.lines
            .borrow()
            .iter()
            .any(|(_, text)| text.contains(needle))
    }
}

#[cfg(test)]
impl RunLog for MemoryLog {
    fn info(&self, message: &str) {
        self.lines
            .borrow_mut()
            .push((Severity::Info, message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.lines
            .borrow_mut()
            .push((Severity::Warning, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.lines
            .borrow_mut()
            .push((Severity::Error, message.to_string()));
    }
}
