//! Configuration loading, env substitution, and validation.
//!
//! Config files: `parley.toml`, `parley.yaml`, or `parley.json`
//! Searched in `./` then `~/.config/parley/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-fallback}` substitution in the raw
//! file before parsing.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{config_dir, discover_and_load, find_config_file, load_config, to_toml},
    schema::{
        CREATOR_REFERENCE, DialogDefaults, DialogScript, EMBED_COLOR_NEGATIVE, EmbedDefaults,
        ParleyConfig, ScriptStep, StepKind, StepOverrides,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
