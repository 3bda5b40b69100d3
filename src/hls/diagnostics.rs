//! Injectable diagnostics sink for the video pipeline.

/// Severity of a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Warning,
    Error,
}

/// Receiver for pipeline diagnostics.
///
/// Components take an `Arc<dyn Diagnostics>` at construction.
pub trait Diagnostics: Send + Sync {
    /// Record a single diagnostic line.
    fn record(&self, severity: Severity, message: &str);

    fn debug(&self, message: &str) {
        self.record(Severity::Debug, message);
    }

    fn warn(&self, message: &str) {
        self.record(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        self.record(Severity::Error, message);
    }
}

/// Diagnostics forwarded to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics {
    verbose: bool,
}

impl TracingDiagnostics {
    /// Create a sink. Debug lines are dropped unless `verbose` is set.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Diagnostics for TracingDiagnostics {
    fn record(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug if self.verbose => tracing::debug!("{}", message),
            Severity::Debug => {}
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
        }
    }
}

/// Diagnostics that go nowhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentDiagnostics;

impl Diagnostics for SilentDiagnostics {
    fn record(&self, _severity: Severity, _message: &str) {}
}
