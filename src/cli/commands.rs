//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{Layout, TreeSummary};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{ConnectionTree, SortOrder};
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config_file.as_deref())?;
    debug!(?settings, "settings loaded");

    match &cli.command {
        Some(Commands::Show { layout }) => cmd_show(&settings, layout),
        Some(Commands::Check { layout }) => cmd_check(&settings, layout),
        Some(Commands::Sort { layout, descending }) => cmd_sort(&settings, layout, *descending),
        Some(Commands::Find { layout, name }) => cmd_find(&settings, layout, name),
        Some(Commands::Config { command }) => cmd_config(&settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

fn build_tree(settings: &Settings, layout: &Path) -> CliResult<ConnectionTree> {
    let layout = Layout::load(layout)?;
    Ok(layout.build(settings)?)
}

#[instrument(skip(settings))]
fn cmd_show(settings: &Settings, layout: &Path) -> CliResult<()> {
    let tree = build_tree(settings, layout)?;
    output::info(&tree.to_tree_string(&settings.display));
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_check(settings: &Settings, layout: &Path) -> CliResult<()> {
    let tree = build_tree(settings, layout)?;
    tree.verify()?;
    output::success(&format!("{}: {}", layout.display(), TreeSummary::of(&tree)));
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_sort(settings: &Settings, layout: &Path, descending: bool) -> CliResult<()> {
    let mut tree = build_tree(settings, layout)?;
    let order = if descending {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    let root = tree.root();
    tree.sort_recursive(root, order)?;
    output::info(&tree.to_tree_string(&settings.display));
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_find(settings: &Settings, layout: &Path, name: &str) -> CliResult<()> {
    if name.trim().is_empty() {
        return Err(CliError::InvalidArgs("name must not be empty".to_string()));
    }
    let tree = build_tree(settings, layout)?;
    let matches = tree.find_by_name(name);
    if matches.is_empty() {
        output::warning(&format!("no node named '{}'", name));
        return Ok(());
    }
    for id in matches {
        output::info(&tree.path_of(id)?.join(" / "));
    }
    Ok(())
}

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::header("Effective settings");
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => {
                return Err(CliError::Usage(
                    "no home directory, global config unavailable".to_string(),
                ))
            }
        },
    }
    Ok(())
}
