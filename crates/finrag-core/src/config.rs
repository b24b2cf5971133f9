//! Layered configuration: `config.toml` + `config.<env>.toml` + `APP_*`
//! environment variables, with shell-style path expansion helpers.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::borrow::Cow;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Load configuration for the environment named by `RUST_ENV`
    /// (default `dev`). Missing files merge as empty, so a bare process
    /// with only `APP_*` variables still loads.
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for(&env_name)
    }

    // Source order is base file, environment overlay, then APP_*
    // variables; later sources win.
    fn load_for(env_name: &str) -> anyhow::Result<Self> {
        let overlay = match env_name {
            "dev" | "development" => Some("config.dev.toml"),
            "prod" | "production" => Some("config.prod.toml"),
            "test" | "testing" => Some("config.test.toml"),
            _ => None,
        };
        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        if let Some(file) = overlay {
            figment = figment.merge(Toml::file(file));
        }
        let config = Self { figment: figment.merge(Env::prefixed("APP_")) };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("config key '{}': {}", key, e))
    }

    /// Like [`get`](Self::get) but with an in-code default for keys the
    /// deployment is free to omit.
    pub fn get_or<T>(&self, key: &str, default: T) -> T
    where
        T: serde::de::DeserializeOwned,
    {
        self.get(key).unwrap_or(default)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if let Ok(dimension) = self.get::<usize>("embedding.dimension") {
            if dimension == 0 {
                let reason = "embedding.dimension must be positive".to_string();
                return Err(Error::InvalidConfig(reason).into());
            }
        }
        Ok(())
    }
}

/// Expand `${VAR}`/`$VAR` and a leading `~` in a user-supplied path.
/// Unknown variables are left in place; nothing is canonicalized and the
/// path may not exist yet.
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let raw = input.as_ref();
    let with_env = shellexpand::env(raw).unwrap_or(Cow::Borrowed(raw));
    PathBuf::from(shellexpand::tilde(with_env.as_ref()).as_ref())
}

/// Expand `p` and, when it is still relative, anchor it at `base`.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let expanded = expand_path(p);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}
