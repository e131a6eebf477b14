use std::sync::Mutex;

/// Detail used when a failure carries no message of its own.
pub const GENERIC_DETAIL: &str = "Posts - Unknown error, check logs for details";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub severity: Severity,
    pub title: String,
    pub detail: String,
    /// Rendered error chain, kept for diagnostics only.
    pub raw: Option<String>,
}

/// Fire-and-forget notification sink. Callers never inspect the outcome.
pub trait Alerter {
    fn alert(&self, severity: Severity, title: &str, detail: &str, raw: Option<&anyhow::Error>);
}

/// Alert detail for a failed call: the error chain, or the generic text when empty.
pub fn describe(err: &anyhow::Error) -> String {
    let text = format!("{:#}", err);
    if text.trim().is_empty() {
        GENERIC_DETAIL.to_string()
    } else {
        text
    }
}

fn trace(severity: Severity, title: &str, detail: &str, raw: Option<&anyhow::Error>) {
    let raw = raw.map(|e| format!("{:?}", e));
    match severity {
        Severity::Error => tracing::error!(title, detail, raw = raw.as_deref(), "alert"),
        Severity::Warning => tracing::warn!(title, detail, raw = raw.as_deref(), "alert"),
        Severity::Info | Severity::Success => tracing::info!(title, detail, "alert"),
    }
}

/// Alerter for one-shot commands: alerts only go to the log.
#[derive(Debug, Default)]
pub struct LogAlerter;

impl Alerter for LogAlerter {
    fn alert(&self, severity: Severity, title: &str, detail: &str, raw: Option<&anyhow::Error>) {
        trace(severity, title, detail, raw);
    }
}

/// Logs every alert and keeps it so a view can show the latest one.
#[derive(Debug, Default)]
pub struct AlertLog {
    alerts: Mutex<Vec<Alert>>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Alert> {
        self.alerts.lock().ok().and_then(|a| a.last().cloned())
    }

    pub fn all(&self) -> Vec<Alert> {
        self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn dismiss(&self) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.clear();
        }
    }
}

impl Alerter for AlertLog {
    fn alert(&self, severity: Severity, title: &str, detail: &str, raw: Option<&anyhow::Error>) {
        trace(severity, title, detail, raw);
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(Alert {
                severity,
                title: title.to_string(),
                detail: detail.to_string(),
                raw: raw.map(|e| format!("{:?}", e)),
            });
        }
    }
}
