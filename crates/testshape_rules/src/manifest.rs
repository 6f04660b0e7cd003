use log::trace;
use serde_json::Value;
use std::path::Path;
use testshape_core::Result;

use crate::{
    constants::{DEPRECATED_SCRIPT, TEST_NODE_COMMAND, TEST_NODE_SCRIPT},
    json::{parse, render, root_object},
    rule::{ConfigRule, FileKind, Plan, RuleContext},
};

/// `package.json` scripts: canonical `test:node`, no `test:esm`.
pub struct ManifestScripts;

impl ConfigRule for ManifestScripts {
    fn name(&self) -> &'static str {
        "manifest-scripts"
    }

    fn kind(&self) -> FileKind {
        FileKind::Manifest
    }

    fn plan(&self, _ctx: &RuleContext, path: &Path, current: Option<&str>) -> Result<Plan> {
        let Some(text) = current else {
            return Ok(Plan::Absent);
        };
        let mut manifest = parse(path, text)?;
        let Some(scripts) = root_object(path, &mut manifest)?
            .get_mut("scripts")
            .and_then(Value::as_object_mut)
        else {
            return Ok(Plan::Compliant);
        };

        let mut changed = false;
        if let Some(command) = scripts.get_mut(TEST_NODE_SCRIPT)
            && command.as_str() != Some(TEST_NODE_COMMAND)
        {
            trace!("Replacing '{}' script {}", TEST_NODE_SCRIPT, command);
            *command = Value::String(TEST_NODE_COMMAND.to_string());
            changed = true;
        }
        if scripts.shift_remove(DEPRECATED_SCRIPT).is_some() {
            trace!("Removing '{}' script", DEPRECATED_SCRIPT);
            changed = true;
        }

        if !changed {
            return Ok(Plan::Compliant);
        }
        Ok(Plan::Write(render(path, &manifest)?))
    }
}
