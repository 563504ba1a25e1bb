use std::path::{Path, PathBuf};

use {
    anyhow::{Context, Result},
    parley_config::{ParleyConfig, Severity, ValidationResult},
};

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Load the config named on the command line, or discover one.
///
/// An explicit path must load; discovery falls back to defaults.
pub fn load(explicit: Option<&Path>) -> Result<ParleyConfig> {
    match explicit {
        Some(path) => parley_config::load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(parley_config::discover_and_load()),
    }
}

/// Validate the configuration and print diagnostics. Exits non-zero on errors.
pub fn check(explicit: Option<&Path>) -> Result<()> {
    let path: Option<PathBuf> = explicit
        .map(Path::to_path_buf)
        .or_else(parley_config::find_config_file);

    let config = match &path {
        Some(path) => {
            eprintln!("Checking {}\n", path.display());
            parley_config::load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?
        },
        None => {
            eprintln!("No config file found; checking defaults.\n");
            ParleyConfig::default()
        },
    };

    let result = parley_config::validate(&config);
    print_diagnostics(&result);

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    if !result.diagnostics.is_empty() {
        eprintln!();
    }
    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Print the effective configuration as TOML.
pub fn show(explicit: Option<&Path>) -> Result<()> {
    let config = load(explicit)?;
    print!("{}", parley_config::to_toml(&config)?);
    Ok(())
}

pub fn print_diagnostics(result: &ValidationResult) {
    for d in &result.diagnostics {
        let color = match d.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
        };
        eprintln!(
            "  {BOLD}{color}{}{RESET} {}: {}",
            d.severity, d.path, d.message
        );
    }
}
