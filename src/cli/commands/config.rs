//! `tuoyu config` command - Configuration management
//!
//! Provides commands to view and modify tuoyu configuration.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::core::config::CONFIG_KEYS;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path(PathArgs),

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,

    /// Show only the working-directory config file
    #[arg(long = "local-only", conflicts_with = "global_only")]
    pub local_only: bool,

    /// Show only global (user) config
    #[arg(long = "global-only")]
    pub global_only: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., search_endpoint, default_format)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of the working-directory config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of the working-directory config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Show only the working-directory config path
    #[arg(long = "local-only", conflicts_with = "global_only")]
    pub local_only: bool,

    /// Show only global config path
    #[arg(long = "global-only")]
    pub global_only: bool,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args),
        ConfigCommands::Set(args) => run_set(args, global.quiet),
        ConfigCommands::Unset(args) => run_unset(args, global.quiet),
        ConfigCommands::Path(args) => run_path(args),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs) -> Result<()> {
    let config = Config::load();

    // If a specific key is requested, show just that value
    if let Some(key) = &args.key {
        check_key(key)?;
        return match config.get(key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    if args.local_only {
        show_config_file("Local config:", &local_config_path()?)?;
    } else if args.global_only {
        show_config_file("Global config:", &global_config_path()?)?;
    } else {
        println!("{}", style("Effective Configuration").bold().underlined());
        println!();

        for (key, _) in CONFIG_KEYS {
            print_config_value(key, config.get(key).as_deref());
        }

        println!();
        println!("{}", style("Config Sources (in priority order):").dim());
        println!("  1. Environment variables (TUOYU_SEARCH_ENDPOINT, TUOYU_DEFAULT_FORMAT, TUOYU_REPORT_TEMPLATE)");
        println!("  2. Working directory config (.tuoyu.yaml)");
        println!("  3. Global config (~/.config/tuoyu/config.yaml)");
    }

    Ok(())
}

fn run_set(args: SetArgs, quiet: bool) -> Result<()> {
    check_key(&args.key)?;
    let config_path = target_path(args.global)?;

    let mut config_map = read_mapping(&config_path)?;
    config_map.insert(
        serde_yml::Value::String(args.key.clone()),
        serde_yml::Value::String(args.value.clone()),
    );

    // Reject values that would leave the file unloadable
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    serde_yml::from_str::<Config>(&yaml)
        .map_err(|e| miette::miette!("Invalid value for '{}': {}", args.key, e))?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    fs::write(&config_path, yaml).into_diagnostic()?;
    tracing::debug!(path = %config_path.display(), key = %args.key, "config updated");

    if !quiet {
        println!(
            "{} Set {} {} {} in {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            style("→").dim(),
            style(&args.value).yellow(),
            scope_name(args.global)
        );
    }

    Ok(())
}

fn run_unset(args: UnsetArgs, quiet: bool) -> Result<()> {
    let config_path = target_path(args.global)?;

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut config_map = read_mapping(&config_path)?;
    let removed = config_map
        .remove(&serde_yml::Value::String(args.key.clone()))
        .is_some();

    if !removed {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    if !quiet {
        println!(
            "{} Removed {} from {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            scope_name(args.global)
        );
    }

    Ok(())
}

fn run_path(args: PathArgs) -> Result<()> {
    if args.local_only {
        println!("{}", local_config_path()?.display());
    } else if args.global_only {
        println!("{}", global_config_path()?.display());
    } else {
        println!("{}", style("Configuration file paths:").bold());
        println!();
        print_path("Global:", &global_config_path()?);
        println!();
        print_path("Local:", &local_config_path()?);
    }

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in CONFIG_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'tuoyu config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

// Helper functions

fn check_key(key: &str) -> Result<()> {
    if Config::is_valid_key(key) {
        Ok(())
    } else {
        Err(miette::miette!(
            help = "Run 'tuoyu config keys' to list valid keys",
            "Unknown configuration key '{}'",
            key
        ))
    }
}

fn scope_name(global: bool) -> &'static str {
    if global {
        "global"
    } else {
        "local"
    }
}

fn target_path(global: bool) -> Result<PathBuf> {
    if global {
        global_config_path()
    } else {
        local_config_path()
    }
}

fn global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn local_config_path() -> Result<PathBuf> {
    Config::local_config_path()
        .ok_or_else(|| miette::miette!("Could not determine the working directory"))
}

/// Load a config file as a YAML mapping; missing or empty files give an empty one
fn read_mapping(path: &Path) -> Result<serde_yml::Mapping> {
    if !path.exists() {
        return Ok(serde_yml::Mapping::new());
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    match serde_yml::from_str::<serde_yml::Value>(&content) {
        Ok(serde_yml::Value::Mapping(map)) => Ok(map),
        Ok(serde_yml::Value::Null) => Ok(serde_yml::Mapping::new()),
        Ok(_) => Err(miette::miette!(
            "Config file {} is not a mapping",
            path.display()
        )),
        Err(e) => Err(miette::miette!("Invalid config {}: {}", path.display(), e)),
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}

fn print_path(label: &str, path: &Path) {
    println!("  {} {}", style(label).cyan(), path.display());
    if path.exists() {
        println!("         {}", style("(exists)").green());
    } else {
        println!("         {}", style("(not created)").dim());
    }
}

fn show_config_file(title: &str, path: &Path) -> Result<()> {
    println!("{} {}", style(title).bold(), style(path.display()).dim());
    println!();

    if path.exists() {
        let content = fs::read_to_string(path).into_diagnostic()?;
        print!("{}", content);
    } else {
        println!("{}", style("(not created)").dim());
    }

    Ok(())
}
