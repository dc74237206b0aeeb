//! Where an agent file lives inside a project.

use crate::manifest::{AgentEntry, AgentMode, Manifest, is_safe_name};
use crate::RegistryError;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub absolute: PathBuf,
    pub relative: PathBuf,
}

/// Primary agents sit at `{base_path}/{name}.md`, others at
/// `{base_path}/{category}/{name}.md`, both resolved under `root`.
///
/// A destination that would land outside the agents directory is refused.
pub fn destination(
    manifest: &Manifest,
    agent: &AgentEntry,
    root: &Path,
) -> Result<Destination, RegistryError> {
    if !is_safe_name(&agent.name) {
        return Err(RegistryError::Security(format!(
            "invalid agent name \"{}\"",
            agent.name
        )));
    }
    let base = Path::new(&manifest.base_path);
    let file = format!("{}.md", agent.name);
    let relative = match agent.mode {
        AgentMode::Primary => base.join(file),
        AgentMode::Subagent => base.join(&agent.category).join(file),
    };
    let absolute = normalize(&root.join(&relative));
    let safe_base = normalize(&root.join(base));
    if !absolute.starts_with(&safe_base) || absolute == safe_base {
        return Err(RegistryError::Security(format!(
            "path \"{}\" escapes agents directory. Agent \"{}\" rejected.",
            relative.display(),
            agent.name
        )));
    }
    Ok(Destination { absolute, relative })
}

/// Directory holding every installed agent for `root`.
pub fn agents_dir(manifest: &Manifest, root: &Path) -> PathBuf {
    normalize(&root.join(&manifest.base_path))
}

/// Lexical normalization: drops `.` and resolves `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        Manifest::from_json(r#"{"agents": []}"#).unwrap()
    }

    fn agent(name: &str, category: &str, mode: AgentMode) -> AgentEntry {
        AgentEntry {
            name: name.into(),
            category: category.into(),
            path: format!("{category}/{name}"),
            mode,
            description: String::new(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn subagents_go_under_category() {
        let d = destination(
            &manifest(),
            &agent("rust-pro", "languages", AgentMode::Subagent),
            Path::new("/proj"),
        )
        .unwrap();
        assert_eq!(
            d.absolute,
            PathBuf::from("/proj/.opencode/agents/languages/rust-pro.md")
        );
        assert_eq!(
            d.relative,
            PathBuf::from(".opencode/agents/languages/rust-pro.md")
        );
    }

    #[test]
    fn primary_agents_sit_at_root() {
        let d = destination(
            &manifest(),
            &agent("planner", "core", AgentMode::Primary),
            Path::new("/proj"),
        )
        .unwrap();
        assert_eq!(d.absolute, PathBuf::from("/proj/.opencode/agents/planner.md"));
    }

    #[test]
    fn escaping_category_is_refused() {
        let err = destination(
            &manifest(),
            &agent("x", "../../../etc", AgentMode::Subagent),
            Path::new("/proj"),
        )
        .unwrap_err();
        assert!(err.is_security());
    }

    #[test]
    fn unsafe_name_is_refused() {
        let err = destination(
            &manifest(),
            &agent("../x", "languages", AgentMode::Primary),
            Path::new("/proj"),
        )
        .unwrap_err();
        assert!(err.is_security());
    }
}
