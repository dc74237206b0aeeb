//! Command-line surface.

use clap::{Args as ClapArgs, Parser, Subcommand};
use core_registry::permissions::{OverrideSpec, Preset};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "agentdeck",
    version,
    about = "Browse, install and remove agent templates"
)]
pub struct Args {
    /// Configuration file (overrides discovery of `agentdeck.toml`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Agent manifest JSON.
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,
    /// Project root that agents are installed under.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install one agent, a category, a pack or everything.
    #[command(visible_aliases = ["i", "add"])]
    Install(InstallArgs),
    /// Remove installed agents.
    #[command(visible_alias = "rm")]
    Uninstall(UninstallArgs),
    /// List available agents grouped by category.
    #[command(visible_alias = "ls")]
    List {
        /// List packs instead of agents.
        #[arg(long)]
        packs: bool,
    },
    /// Search agents by name, description, category and tags.
    #[command(visible_alias = "find")]
    Search { query: String },
    /// Open the interactive browser (default on a terminal).
    Tui(TuiArgs),
}

#[derive(ClapArgs, Debug, Default)]
pub struct InstallArgs {
    /// Agent name.
    #[arg(required_unless_present_any = ["category", "pack", "all"])]
    pub agent: Option<String>,
    /// Install every agent of a category.
    #[arg(long, conflicts_with_all = ["agent", "pack", "all"])]
    pub category: Option<String>,
    /// Install a predefined pack.
    #[arg(long, conflicts_with_all = ["agent", "all"])]
    pub pack: Option<String>,
    /// Install every agent in the manifest.
    #[arg(long, conflicts_with = "agent")]
    pub all: bool,
    /// Overwrite existing agent files.
    #[arg(long)]
    pub force: bool,
    /// Report what would happen without writing files.
    #[arg(long)]
    pub dry_run: bool,
    #[command(flatten)]
    pub permissions: PermissionArgs,
}

#[derive(ClapArgs, Debug, Default)]
pub struct PermissionArgs {
    /// Permission preset: strict, balanced, permissive or yolo.
    #[arg(long = "permissions", value_name = "PRESET", value_parser = parse_preset)]
    pub preset: Option<Preset>,
    /// Allow everything for this run (never saved).
    #[arg(long)]
    pub yolo: bool,
    /// `[agent:]permission=action`, repeatable.
    #[arg(long = "permission-override", value_name = "SPEC")]
    pub overrides: Vec<OverrideSpec>,
    /// Store the preset and overrides as the default for later installs.
    #[arg(long, conflicts_with = "no_saved_permissions")]
    pub save_permissions: bool,
    /// Ignore saved permission preferences.
    #[arg(long)]
    pub no_saved_permissions: bool,
}

#[derive(ClapArgs, Debug)]
pub struct UninstallArgs {
    #[arg(required = true)]
    pub agents: Vec<String>,
    /// Report what would be removed without deleting.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(ClapArgs, Debug, Default, Clone, Copy)]
pub struct TuiArgs {
    /// Overwrite existing agent files.
    #[arg(long)]
    pub force: bool,
    /// Run installs and removals without touching disk.
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_preset(name: &str) -> Result<Preset, String> {
    Preset::parse(name).map_err(|_| {
        let valid: Vec<&str> = Preset::ALL.iter().map(|p| p.as_str()).collect();
        format!("valid presets: {}", valid.join(", "))
    })
}
