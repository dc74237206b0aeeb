//! Non-interactive subcommands.
//!
//! Output builders return the text so it can be checked with a plain theme;
//! the `run_*` functions print it and produce the process exit code.

use crate::cli::{InstallArgs, PermissionArgs, UninstallArgs};
use anyhow::Result;
use core_registry::permissions::{
    Preferences, PreferencesStore, Preset, ResolveInput, WarningLevel,
    preset_warning, resolve_permissions,
};
use core_registry::{
    AgentEntry, AgentInstall, AgentSource, InstallCounts, InstallOptions, InstallOutcome,
    Installer, Manifest, UninstallOutcome,
};
use core_render::Theme;
use core_render::style::{BOLD, BOLD_CYAN, CYAN, DIM, GREEN, RED, YELLOW};
use core_text::pad;
use std::fmt::Write as _;
use std::sync::Arc;

const MAX_SUGGESTIONS: usize = 5;

/// Uniform error block on stderr.
pub fn error_message(theme: &Theme, message: &str) -> String {
    format!(
        "\n  {} {}\n",
        theme.paint(RED, "✗"),
        theme.paint(RED, message)
    )
}

/// Names to offer for a mistyped agent: search hits first, then near spellings.
pub fn suggestions(manifest: &Manifest, name: &str) -> Vec<String> {
    let mut out: Vec<String> = manifest
        .search_agents(name)
        .into_iter()
        .map(|a| a.name.clone())
        .take(MAX_SUGGESTIONS)
        .collect();
    if out.is_empty() {
        let needle = name.to_lowercase();
        let limit = (needle.chars().count() / 3).max(2);
        let mut near: Vec<(usize, &str)> = manifest
            .agents
            .iter()
            .map(|a| (edit_distance(&needle, &a.name), a.name.as_str()))
            .filter(|(d, _)| *d <= limit)
            .collect();
        near.sort();
        out = near
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, n)| n.to_string())
            .collect();
    }
    out
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diag
            } else {
                1 + diag.min(above).min(row[j])
            };
            diag = above;
        }
    }
    row[b.len()]
}

fn unknown_agent(theme: &Theme, manifest: &Manifest, name: &str) -> String {
    let mut out = error_message(theme, &format!("Agent \"{name}\" not found."));
    let hints = suggestions(manifest, name);
    if !hints.is_empty() {
        let names: Vec<String> = hints.iter().map(|n| theme.paint(BOLD_CYAN, n)).collect();
        let _ = writeln!(out, "  Did you mean: {}?\n", names.join(", "));
    }
    out
}

pub fn agent_list(manifest: &Manifest, theme: &Theme) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n{} {} {} {}",
        theme.paint(BOLD, "📦 agentdeck"),
        theme.paint(DIM, "-"),
        theme.paint(BOLD_CYAN, &manifest.agents.len().to_string()),
        theme.paint(DIM, "agents available")
    );
    let name_width = manifest.agents.iter().map(|a| a.name.len()).max().unwrap_or(0);
    for (id, meta) in &manifest.categories {
        let agents = manifest.agents_in_category(id);
        if agents.is_empty() {
            continue;
        }
        let _ = writeln!(
            out,
            "\n{} {} {}",
            meta.icon,
            theme.paint(BOLD, &meta.label),
            theme.paint(DIM, &format!("({})", agents.len()))
        );
        for agent in agents {
            let star = if agent.mode == core_registry::AgentMode::Primary {
                theme.paint(YELLOW, " ★")
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                "  {} {}{star}",
                pad(&theme.paint(CYAN, &agent.name), name_width),
                theme.paint(DIM, &agent.description)
            );
        }
    }
    let _ = writeln!(
        out,
        "\n{}\n",
        theme.paint(
            DIM,
            &format!("  ★ = primary agent (placed at {}/<name>.md)", manifest.base_path)
        )
    );
    out
}

pub fn pack_list(manifest: &Manifest, theme: &Theme) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n{} {}\n",
        theme.paint(BOLD, "📦 agentdeck"),
        theme.paint(DIM, "- available packs")
    );
    for (id, pack) in &manifest.packs {
        let _ = writeln!(
            out,
            "  {} {} - {}",
            theme.paint(BOLD_CYAN, id),
            theme.paint(DIM, &format!("({} agents)", pack.agents.len())),
            pack.description
        );
        for name in &pack.agents {
            let _ = writeln!(out, "    {} {name}", theme.paint(DIM, "•"));
        }
        out.push('\n');
    }
    out
}

pub fn search_results(manifest: &Manifest, query: &str, theme: &Theme) -> String {
    let results = manifest.search_agents(query);
    let quoted = theme.paint(BOLD, &format!("\"{query}\""));
    if results.is_empty() {
        return format!(
            "\n  {} No agents found matching {quoted}\n\n",
            theme.paint(YELLOW, "⚠")
        );
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n  {} {} {} {quoted}\n",
        theme.paint(CYAN, "ℹ"),
        theme.paint(BOLD_CYAN, &results.len().to_string()),
        theme.paint(DIM, "result(s) for")
    );
    let name_width = results.iter().map(|a| a.name.len()).max().unwrap_or(0);
    for agent in results {
        let _ = writeln!(
            out,
            "  {} {}  {}",
            pad(&theme.paint(CYAN, &agent.name), name_width),
            theme.paint(DIM, &format!("({})", agent.category)),
            theme.paint(DIM, &agent.description)
        );
    }
    out.push('\n');
    out
}

/// Agents named by the install arguments, with an optional heading.
pub fn install_targets<'m>(
    manifest: &'m Manifest,
    args: &InstallArgs,
    theme: &Theme,
) -> Result<(Option<String>, Vec<&'m AgentEntry>), String> {
    if args.all {
        let agents: Vec<&AgentEntry> = manifest.agents.iter().collect();
        return Ok((
            Some(format!("Installing all {} agents...", agents.len())),
            agents,
        ));
    }
    if let Some(id) = &args.category {
        if manifest.category(id).is_none() {
            let valid: Vec<&str> = manifest.category_ids().collect();
            return Err(error_message(
                theme,
                &format!(
                    "Unknown category \"{id}\". Valid categories: {}",
                    valid.join(", ")
                ),
            ));
        }
        let agents = manifest.agents_in_category(id);
        if agents.is_empty() {
            return Err(error_message(
                theme,
                &format!("No agents found in category \"{id}\"."),
            ));
        }
        return Ok((
            Some(format!(
                "Installing {} agents from category \"{id}\"...",
                agents.len()
            )),
            agents,
        ));
    }
    if let Some(id) = &args.pack {
        if manifest.get_pack(id).is_none() {
            let valid: Vec<&str> = manifest.pack_ids().collect();
            return Err(error_message(
                theme,
                &format!("Unknown pack \"{id}\". Available packs: {}", valid.join(", ")),
            ));
        }
        let agents = manifest.resolve_pack_agents(id);
        return Ok((
            Some(format!(
                "Installing pack \"{id}\" ({} agents)...",
                agents.len()
            )),
            agents,
        ));
    }
    let name = args.agent.as_deref().unwrap_or_default();
    match manifest.get_agent(name) {
        Some(agent) => Ok((None, vec![agent])),
        None => Err(unknown_agent(theme, manifest, name)),
    }
}

/// One report line per agent.
pub fn install_line(report: &AgentInstall, dry_run: bool, theme: &Theme) -> String {
    let dest = report
        .relative
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let arrow = theme.paint(DIM, "→");
    let name = theme.paint(BOLD, &report.name);
    match report.outcome {
        InstallOutcome::Installed if dry_run => format!(
            "  {} {} {name} {arrow} {}",
            theme.paint(CYAN, "ℹ"),
            theme.paint(DIM, "would install"),
            theme.paint(DIM, &dest)
        ),
        InstallOutcome::Installed => format!(
            "  {} {name} {arrow} {}",
            theme.paint(GREEN, "✓"),
            theme.paint(DIM, &dest)
        ),
        InstallOutcome::Skipped => format!(
            "  {} {name} {arrow} {} {}",
            theme.paint(YELLOW, "⚠"),
            theme.paint(DIM, &dest),
            theme.paint(YELLOW, "(already exists, use --force)")
        ),
        InstallOutcome::Failed => format!(
            "  {} {name} {arrow} {}",
            theme.paint(RED, "✗"),
            theme.paint(RED, report.detail.as_deref().unwrap_or("failed"))
        ),
    }
}

pub fn install_summary(counts: InstallCounts, theme: &Theme) -> String {
    let mut parts = Vec::new();
    if counts.installed > 0 {
        parts.push(theme.paint(GREEN, &format!("{} installed", counts.installed)));
    }
    if counts.skipped > 0 {
        parts.push(theme.paint(YELLOW, &format!("{} skipped", counts.skipped)));
    }
    if counts.failed > 0 {
        parts.push(theme.paint(RED, &format!("{} failed", counts.failed)));
    }
    format!("\n  {}", parts.join(&theme.paint(DIM, ", ")))
}

/// Preset the run will apply, for the up-front warning.
fn effective_preset(args: &PermissionArgs, saved: Option<&Preferences>) -> Option<Preset> {
    if args.yolo {
        return Some(Preset::Yolo);
    }
    args.preset.or_else(|| saved.and_then(|p| p.preset))
}

pub async fn run_install<S: AgentSource>(
    installer: &Installer<S>,
    args: &InstallArgs,
    store: Option<&PreferencesStore>,
    theme: &Theme,
) -> Result<i32> {
    let manifest = Arc::clone(installer.manifest());
    let (heading, agents) = match install_targets(&manifest, args, theme) {
        Ok(targets) => targets,
        Err(message) => {
            eprint!("{message}");
            return Ok(1);
        }
    };

    let perms = &args.permissions;
    if perms.save_permissions {
        let prefs = Preferences {
            preset: if perms.yolo { Some(Preset::Yolo) } else { perms.preset },
            overrides: perms.overrides.clone(),
        };
        let saved = match store {
            Some(store) => store.save(&prefs).map(|()| store.path().display().to_string()),
            None => Err(core_registry::RegistryError::Security(
                "no configuration directory for saved preferences".into(),
            )),
        };
        match saved {
            Ok(path) => println!("  {} Saved permission defaults to {path}", theme.paint(CYAN, "ℹ")),
            Err(e) => {
                eprint!("{}", error_message(theme, &e.to_string()));
                return Ok(1);
            }
        }
    }
    let saved = if perms.no_saved_permissions {
        None
    } else {
        store.and_then(PreferencesStore::load)
    };

    if let Some(preset) = effective_preset(perms, saved.as_ref()) {
        let warning = preset_warning(preset);
        if warning.level <= WarningLevel::High {
            let style = if warning.level == WarningLevel::Critical { RED } else { YELLOW };
            eprintln!(
                "\n  {} {}: {}",
                warning.level.icon(),
                theme.paint(style, warning.title),
                warning.message
            );
        }
    }

    if let Some(heading) = heading {
        println!("\n{}\n", theme.paint(BOLD, &heading));
    }
    let options = InstallOptions {
        force: args.force,
        dry_run: args.dry_run,
    };
    let mut reports = Vec::with_capacity(agents.len());
    for agent in agents {
        let map = resolve_permissions(&ResolveInput {
            built_in: None,
            saved: saved.as_ref(),
            cli_preset: perms.preset,
            cli_yolo: perms.yolo,
            cli_overrides: &perms.overrides,
            agent: &agent.name,
        });
        let report = installer.install_agent(agent, options, map.as_ref()).await;
        println!("{}", install_line(&report, args.dry_run, theme));
        reports.push(report);
    }
    let counts = InstallCounts::from_results(&reports);
    println!("{}", install_summary(counts, theme));
    Ok(if counts.failed > 0 { 1 } else { 0 })
}

pub fn uninstall_line(
    name: &str,
    outcome: Result<UninstallOutcome, String>,
    dry_run: bool,
    theme: &Theme,
) -> String {
    let bold = theme.paint(BOLD, name);
    match outcome {
        Ok(UninstallOutcome::Removed) if dry_run => format!(
            "  {} {} {bold}",
            theme.paint(CYAN, "ℹ"),
            theme.paint(DIM, "would remove")
        ),
        Ok(UninstallOutcome::Removed) => format!("  {} removed {bold}", theme.paint(GREEN, "✓")),
        Ok(UninstallOutcome::NotFound) => format!(
            "  {} {bold} {}",
            theme.paint(YELLOW, "⚠"),
            theme.paint(YELLOW, "is not installed")
        ),
        Ok(UninstallOutcome::Failed) => format!(
            "  {} {bold} {}",
            theme.paint(RED, "✗"),
            theme.paint(RED, "could not be removed")
        ),
        Err(reason) => format!("  {} {bold} {}", theme.paint(RED, "✗"), theme.paint(RED, &reason)),
    }
}

pub fn run_uninstall<S: AgentSource>(
    installer: &Installer<S>,
    args: &UninstallArgs,
    theme: &Theme,
) -> i32 {
    let manifest = Arc::clone(installer.manifest());
    let mut failed = false;
    for name in &args.agents {
        let Some(agent) = manifest.get_agent(name) else {
            eprint!("{}", unknown_agent(theme, &manifest, name));
            failed = true;
            continue;
        };
        let outcome = installer
            .uninstall_agent(agent, args.dry_run)
            .map_err(|e| e.to_string());
        failed |= !matches!(
            outcome,
            Ok(UninstallOutcome::Removed | UninstallOutcome::NotFound)
        );
        println!("{}", uninstall_line(name, outcome, args.dry_run, theme));
    }
    if failed { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    const MANIFEST: &str = r#"{
        "repo": "acme/agents",
        "categories": {
            "data": { "label": "Data", "icon": "🗄" },
            "languages": { "label": "Languages", "icon": "🦀" },
            "empty": { "label": "Nothing" }
        },
        "agents": [
            { "name": "postgres-pro", "category": "data", "path": "data/postgres-pro", "description": "PostgreSQL tuning" },
            { "name": "rust-pro", "category": "languages", "path": "languages/rust-pro", "description": "Rust systems", "tags": ["cargo"] },
            { "name": "planner", "category": "languages", "path": "planner", "mode": "primary", "description": "Plans work" }
        ],
        "packs": {
            "backend": { "label": "Backend", "description": "Server side", "agents": ["postgres-pro", "rust-pro"] }
        }
    }"#;

    fn manifest() -> Manifest {
        Manifest::from_json(MANIFEST).unwrap()
    }

    fn plain() -> Theme {
        Theme::plain()
    }

    #[test]
    fn distance() {
        assert_eq!(edit_distance("rust-pro", "rust-pro"), 0);
        assert_eq!(edit_distance("rsut-pro", "rust-pro"), 2);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn suggestions_prefer_search_then_spelling() {
        let m = manifest();
        assert_eq!(suggestions(&m, "pro"), vec!["postgres-pro", "rust-pro"]);
        assert_eq!(suggestions(&m, "rsut-pro"), vec!["rust-pro"]);
        assert!(suggestions(&m, "zzzzzzzz").is_empty());
    }

    #[test]
    fn unknown_agent_message_offers_names() {
        let text = unknown_agent(&plain(), &manifest(), "rust");
        assert!(text.contains("✗ Agent \"rust\" not found."));
        assert!(text.contains("Did you mean: rust-pro?"));
    }

    #[test]
    fn list_groups_by_category_and_skips_empty() {
        let text = agent_list(&manifest(), &plain());
        assert!(text.contains("3 agents available"));
        assert!(text.contains("🦀 Languages (2)"));
        assert!(!text.contains("Nothing"));
        assert!(text.contains("  planner      Plans work ★"));
        assert!(text.contains(".opencode/agents/<name>.md"));
    }

    #[test]
    fn packs_list_names_members() {
        let text = pack_list(&manifest(), &plain());
        assert!(text.contains("backend (2 agents) - Server side"));
        assert!(text.contains("    • rust-pro"));
    }

    #[test]
    fn search_matches_tags_and_reports_misses() {
        let m = manifest();
        let hit = search_results(&m, "cargo", &plain());
        assert!(hit.contains("1 result(s) for \"cargo\""));
        assert!(hit.contains("rust-pro (languages)  Rust systems"));
        let miss = search_results(&m, "cobol", &plain());
        assert!(miss.contains("No agents found matching \"cobol\""));
    }

    #[test]
    fn targets_for_each_selector() {
        let m = manifest();
        let theme = plain();
        let (heading, agents) = install_targets(
            &m,
            &InstallArgs {
                all: true,
                ..Default::default()
            },
            &theme,
        )
        .unwrap();
        assert_eq!(heading.as_deref(), Some("Installing all 3 agents..."));
        assert_eq!(agents.len(), 3);

        let (heading, agents) = install_targets(
            &m,
            &InstallArgs {
                pack: Some("backend".into()),
                ..Default::default()
            },
            &theme,
        )
        .unwrap();
        assert_eq!(heading.as_deref(), Some("Installing pack \"backend\" (2 agents)..."));
        assert_eq!(agents[1].name, "rust-pro");

        let err = install_targets(
            &m,
            &InstallArgs {
                category: Some("empty".into()),
                ..Default::default()
            },
            &theme,
        )
        .unwrap_err();
        assert!(err.contains("No agents found in category \"empty\"."));

        let err = install_targets(
            &m,
            &InstallArgs {
                category: Some("web".into()),
                ..Default::default()
            },
            &theme,
        )
        .unwrap_err();
        assert!(err.contains("Valid categories: data, languages, empty"));

        let (heading, agents) = install_targets(
            &m,
            &InstallArgs {
                agent: Some("planner".into()),
                ..Default::default()
            },
            &theme,
        )
        .unwrap();
        assert!(heading.is_none());
        assert_eq!(agents[0].name, "planner");
    }

    #[test]
    fn report_lines() {
        let theme = plain();
        let mut report = AgentInstall {
            name: "rust-pro".into(),
            relative: Some(PathBuf::from(".opencode/agents/languages/rust-pro.md")),
            outcome: InstallOutcome::Installed,
            detail: None,
        };
        assert_eq!(
            install_line(&report, false, &theme),
            "  ✓ rust-pro → .opencode/agents/languages/rust-pro.md"
        );
        assert!(install_line(&report, true, &theme).contains("would install rust-pro"));
        report.outcome = InstallOutcome::Skipped;
        assert!(install_line(&report, false, &theme).ends_with("(already exists, use --force)"));
        report.outcome = InstallOutcome::Failed;
        report.detail = Some("HTTP 404".into());
        assert_eq!(install_line(&report, false, &theme), "  ✗ rust-pro → HTTP 404");
    }

    #[test]
    fn summary_lists_nonzero_counts() {
        let counts = InstallCounts {
            installed: 2,
            skipped: 0,
            failed: 1,
        };
        assert_eq!(install_summary(counts, &plain()), "\n  2 installed, 1 failed");
    }

    #[test]
    fn yolo_flag_outranks_presets() {
        let saved = Preferences {
            preset: Some(Preset::Strict),
            overrides: Vec::new(),
        };
        let args = PermissionArgs {
            yolo: true,
            preset: Some(Preset::Balanced),
            ..Default::default()
        };
        assert_eq!(effective_preset(&args, Some(&saved)), Some(Preset::Yolo));
        let args = PermissionArgs::default();
        assert_eq!(effective_preset(&args, Some(&saved)), Some(Preset::Strict));
        assert_eq!(effective_preset(&args, None), None);
    }

    #[test]
    fn uninstall_lines() {
        let theme = plain();
        assert_eq!(
            uninstall_line("a", Ok(UninstallOutcome::Removed), false, &theme),
            "  ✓ removed a"
        );
        assert_eq!(
            uninstall_line("a", Ok(UninstallOutcome::NotFound), false, &theme),
            "  ⚠ a is not installed"
        );
        assert!(uninstall_line("a", Err("symlink".into()), false, &theme).ends_with("symlink"));
    }
}
