use log::Level;

/// A single message recorded while processing a sample
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// Collects warnings and errors from extraction code so the driver can
/// report them once, in order, through the logger
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.push(Level::Debug, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Level::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    fn push(&mut self, level: Level, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            level,
            message: message.into(),
        });
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of entries at exactly `level`
    pub fn count(&self, level: Level) -> usize {
        self.entries.iter().filter(|d| d.level == level).count()
    }

    /// Number of entries at `level` or more severe
    #[cfg(test)]
    pub fn count_at_least(&self, level: Level) -> usize {
        self.entries.iter().filter(|d| d.level <= level).count()
    }

    /// Emit every collected entry through the `log` facade and clear the collector
    pub fn flush(&mut self) {
        for entry in self.entries.drain(..) {
            log::log!(entry.level, "{}", entry.message);
        }
    }
}
