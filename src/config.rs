//! Analyzer configuration.

/// Routines the host runtime invokes directly on every script.
pub const DEFAULT_ENTRY_ROUTINES: [&str; 5] =
    ["Initialize", "MainLoop", "Finalize", "Event", "Loading"];

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Names analysed at the global scope even without a call site.
    pub entry_routines: Vec<String>,
    /// Include never-read variables in the summary.
    pub report_unused: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            entry_routines: DEFAULT_ENTRY_ROUTINES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            report_unused: false,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_entry_routines<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry_routines = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_report_unused(mut self, report_unused: bool) -> Self {
        self.report_unused = report_unused;
        self
    }
}
