use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::DeployError;

const TEMPLATE_EXTENSION: &str = ".json";

/// A Logic App to deploy and the workflow definition to deploy into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicAppTarget {
    pub name: String,
    pub template_path: PathBuf,
}

/// Whether the path named one template or a directory of them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    Single,
    Directory,
}

fn target_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(TEMPLATE_EXTENSION)
        .filter(|name| !name.is_empty())
}

/// A template file with nothing before the extension, which names no Logic App
fn is_unnamed_template(file_name: &str) -> bool {
    file_name == TEMPLATE_EXTENSION
}

/// Resolve `path` into deployment targets without touching the network.
///
/// A directory is walked recursively and every `<name>.json` becomes target `<name>`.
/// A file must itself end in `.json`.
pub fn collect_targets(path: &Path) -> Result<(TargetMode, Vec<LogicAppTarget>)> {
    if !path.exists() {
        return Err(DeployError::PathNotFound(path.to_path_buf()).into());
    }

    if path.is_dir() {
        let mut files = Vec::new();
        walk(path, &mut files)?;
        files.sort();

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut targets = Vec::new();
        for file in files {
            let Some(file_name) = file.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(name) = target_name(file_name) else {
                if is_unnamed_template(file_name) {
                    tracing::warn!(
                        path = %file.display(),
                        "ignoring template without a Logic App name"
                    );
                }
                continue;
            };

            if let Some(first) = seen.get(name) {
                return Err(DeployError::DuplicateTarget {
                    name: name.to_string(),
                    first: first.clone(),
                    second: file,
                }
                .into());
            }
            seen.insert(name.to_string(), file.clone());
            targets.push(LogicAppTarget {
                name: name.to_string(),
                template_path: file,
            });
        }

        tracing::debug!(dir = %path.display(), targets = targets.len(), "collected templates");
        return Ok((TargetMode::Directory, targets));
    }

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(target_name)
        .ok_or_else(|| DeployError::UnsupportedFileType(path.to_path_buf()))?;

    Ok((
        TargetMode::Single,
        vec![LogicAppTarget {
            name: name.to_string(),
            template_path: path.to_path_buf(),
        }],
    ))
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&entry.path(), files)?;
        } else {
            files.push(entry.path());
        }
    }
    Ok(())
}
