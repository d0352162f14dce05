//! Config section trait and run config summary aggregate.
//!
//! [`ConfigSection`] is implemented by [`LlmConfigSummary`] and
//! [`LoopConfigSummary`]; [`RunConfigSummary`] prints them in order (the CLI
//! does so on `--verbose`). Secrets never appear in entries.

use std::io::Write;

mod llm;
mod plan_loop;

pub use llm::LlmConfigSummary;
pub use plan_loop::LoopConfigSummary;

use super::PlanBuildConfig;

/// One block of run config for display.
pub trait ConfigSection: Send + Sync {
    /// Section label, e.g. `"LLM config"`.
    fn section_name(&self) -> &str;
    /// Key-value pairs (no secrets).
    fn entries(&self) -> Vec<(&'static str, String)>;

    /// `[section_name] k1=v1 k2=v2`
    fn render_line(&self) -> String {
        let entries: Vec<String> = self
            .entries()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("[{}] {}", self.section_name(), entries.join(" "))
    }

    /// Best-effort; write errors are ignored.
    fn print_to_stderr(&self) {
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "{}", self.render_line());
        let _ = stderr.flush();
    }
}

#[derive(Default)]
pub struct RunConfigSummary {
    sections: Vec<Box<dyn ConfigSection>>,
}

impl RunConfigSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, s: Box<dyn ConfigSection>) -> Self {
        self.sections.push(s);
        self
    }

    pub fn sections(&self) -> &[Box<dyn ConfigSection>] {
        &self.sections
    }

    pub fn print_to_stderr(&self) {
        for s in &self.sections {
            s.print_to_stderr();
        }
    }
}

/// LLM and loop sections for `config`.
pub fn build_config_summary(config: &PlanBuildConfig) -> RunConfigSummary {
    RunConfigSummary::new()
        .with_section(Box::new(LlmConfigSummary::from_config(config)))
        .with_section(Box::new(LoopConfigSummary {
            max_iterations: config.max_iterations,
        }))
}
