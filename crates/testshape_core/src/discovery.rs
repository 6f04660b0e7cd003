use anyhow::{Result as AnyResult, anyhow};
use log::{debug, info, trace, warn};
use path_clean::clean;
use serde::Deserialize;
use std::{
    env, fs,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use crate::{
    constants::{PACKAGE_MANIFEST, WORKSPACE_MANIFEST},
    error::{MigrateError, Result},
    scan::parse_jsonc,
    types::Project,
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkspaceManifest {
    List(Vec<Project>),
    Object { projects: Vec<Project> },
}

pub fn find_git_root() -> AnyResult<PathBuf> {
    debug!("Searching for git root");
    let mut current_dir = env::current_dir()?;
    trace!("Starting search from: {:?}", current_dir);

    loop {
        let git_dir = current_dir.join(".git");
        trace!("Checking for .git at: {:?}", git_dir);
        if git_dir.exists() {
            debug!("Found git root at: {:?}", current_dir);
            return Ok(current_dir);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                debug!("Could not find .git directory in any parent folder");
                return Err(anyhow!("Could not find .git directory in any parent folder"));
            }
        }
    }
}

/// Lists the workspace's projects in discovery order.
///
/// The central manifest wins when present; an unreadable or malformed one is fatal.
/// Without it, every `<root>/*/*/package.json` with a `name` becomes a project.
pub fn discover_projects(root: &Path) -> Result<Vec<Project>> {
    let manifest_path = root.join(WORKSPACE_MANIFEST);
    match fs::read_to_string(&manifest_path) {
        Ok(content) => {
            debug!("Reading workspace manifest {}", manifest_path.display());
            let value = parse_jsonc(&content).map_err(|e| {
                MigrateError::Discovery(format!("{}: {}", manifest_path.display(), e))
            })?;
            let manifest: WorkspaceManifest = serde_json::from_value(value).map_err(|e| {
                MigrateError::Discovery(format!("{}: {}", manifest_path.display(), e))
            })?;
            let listed = match manifest {
                WorkspaceManifest::List(projects) => projects,
                WorkspaceManifest::Object { projects } => projects,
            };
            let projects: Vec<Project> = listed
                .into_iter()
                .filter_map(|p| match workspace_relative(root, &p.folder) {
                    Some(folder) => Some(Project { folder, ..p }),
                    None => {
                        warn!("Skipping {}: folder {} is outside the workspace", p.name, p.folder.display());
                        None
                    }
                })
                .collect();
            info!("Loaded {} projects from {}", projects.len(), WORKSPACE_MANIFEST);
            Ok(projects)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No {} found, scanning for package manifests", WORKSPACE_MANIFEST);
            scan_package_dirs(root)
        }
        Err(e) => {
            Err(MigrateError::Discovery(format!("{}: {}", manifest_path.display(), e)))
        }
    }
}

/// `folder` as a clean path below `root`, or `None` when it escapes the workspace.
fn workspace_relative(root: &Path, folder: &Path) -> Option<PathBuf> {
    let folder = if folder.is_absolute() { folder.strip_prefix(root).ok()? } else { folder };
    let cleaned = clean(folder);
    if cleaned == Path::new(".") {
        return Some(PathBuf::new());
    }
    cleaned.components().all(|c| matches!(c, Component::Normal(_))).then_some(cleaned)
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| MigrateError::io(dir, e))?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.starts_with('.') && n != "node_modules")
        })
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn scan_package_dirs(root: &Path) -> Result<Vec<Project>> {
    let mut projects = Vec::new();
    let groups = sorted_subdirs(root).map_err(|e| MigrateError::Discovery(e.to_string()))?;

    for group in groups {
        let packages = match sorted_subdirs(&group) {
            Ok(p) => p,
            Err(e) => {
                warn!("Skipping {}: {}", group.display(), e);
                continue;
            }
        };
        for package_dir in packages {
            let manifest = package_dir.join(PACKAGE_MANIFEST);
            if !manifest.is_file() {
                continue;
            }
            trace!("Found package manifest at {}", manifest.display());
            let name = fs::read_to_string(&manifest)
                .ok()
                .and_then(|c| parse_jsonc(&c).ok())
                .and_then(|v| v.get("name").and_then(|n| n.as_str()).map(str::to_string));
            let Some(name) = name else {
                warn!("Skipping {}: no readable package name", manifest.display());
                continue;
            };
            let folder = package_dir.strip_prefix(root).unwrap_or(&package_dir).to_path_buf();
            projects.push(Project { name, folder });
        }
    }

    info!("Discovered {} projects by directory scan", projects.len());
    Ok(projects)
}

/// Keeps projects whose name or folder contains any filter token, in order.
pub fn filter_projects(projects: Vec<Project>, filters: &[String]) -> Vec<Project> {
    projects.into_iter().filter(|p| p.matches_filter(filters)).collect()
}
