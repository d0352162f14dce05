//! Loop config block for run config summary.

use super::ConfigSection;

pub struct LoopConfigSummary {
    pub max_iterations: u32,
}

impl ConfigSection for LoopConfigSummary {
    fn section_name(&self) -> &str {
        "Loop config"
    }

    fn entries(&self) -> Vec<(&'static str, String)> {
        vec![("max_iterations", self.max_iterations.to_string())]
    }
}
