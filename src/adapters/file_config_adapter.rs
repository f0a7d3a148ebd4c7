//! INI file configuration adapter with `STOCKCAST_<SECTION>_<KEY>` overrides.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::collections::HashMap;
use std::path::Path;

pub const ENV_PREFIX: &str = "STOCKCAST_";

pub struct FileConfigAdapter {
    config: Ini,
    overrides: HashMap<(String, String), String>,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self {
            config,
            overrides: HashMap::new(),
        })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self {
            config,
            overrides: HashMap::new(),
        })
    }

    /// Empty configuration; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self {
            config: Ini::new(),
            overrides: HashMap::new(),
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(std::env::vars())
    }

    /// Apply `STOCKCAST_<SECTION>_<KEY>=value` pairs. Other names are ignored.
    ///
    /// `FMP_API_KEY` is accepted as a fallback for `[fmp] api_key`.
    pub fn with_overrides<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut fmp_key = None;
        for (name, value) in vars {
            if name == "FMP_API_KEY" {
                fmp_key = Some(value);
                continue;
            }
            let Some(rest) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            if let Some((section, key)) = rest.split_once('_') {
                if !section.is_empty() && !key.is_empty() {
                    self.overrides
                        .insert((section.to_lowercase(), key.to_lowercase()), value);
                }
            }
        }
        if let Some(key) = fmp_key {
            if self.get_string("fmp", "api_key").is_none() {
                self.overrides
                    .insert(("fmp".to_string(), "api_key".to_string()), key);
            }
        }
        self
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.overrides
            .get(&(section.to_lowercase(), key.to_lowercase()))
            .cloned()
            .or_else(|| self.config.get(section, key))
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.get_string(section, key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_string(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}
