use std::path::Path;
use testshape_core::Result;

use crate::rule::{ConfigRule, FileKind, Plan, RuleContext};

/// `vitest.config.esm.ts` is no longer used and is deleted wherever it exists.
pub struct DeprecatedRunnerConfig;

impl ConfigRule for DeprecatedRunnerConfig {
    fn name(&self) -> &'static str {
        "deprecated-esm-config"
    }

    fn kind(&self) -> FileKind {
        FileKind::DeprecatedRunnerConfig
    }

    fn reads_contents(&self) -> bool {
        false
    }

    fn plan(&self, _ctx: &RuleContext, _path: &Path, current: Option<&str>) -> Result<Plan> {
        Ok(if current.is_some() { Plan::Delete } else { Plan::Absent })
    }
}
