use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::lookup::Resource;
use crate::throttle::{DEFAULT_PAUSE_DELAY, DEFAULT_PAUSE_PROBABILITY};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");
pub const DEFAULT_BASE_URL: &str = "https://www.dictionaryapi.com/api/v1";
const SHARED_KEY_ENV: &str = "MW_API_KEY";

#[derive(Debug, Clone)]
pub struct Settings {
    pub resource: Resource,
    pub base_url: String,
    pub keys: HashMap<String, String>,
    pub timeout: Duration,
    pub throttle_probability: f64,
    pub throttle_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resource: Resource::Learners,
            base_url: DEFAULT_BASE_URL.to_string(),
            keys: HashMap::new(),
            timeout: Duration::from_secs(30),
            throttle_probability: DEFAULT_PAUSE_PROBABILITY,
            throttle_delay: DEFAULT_PAUSE_DELAY,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    dictionary: Option<DictionarySettings>,
    keys: Option<HashMap<String, String>>,
    http: Option<HttpSettings>,
    throttle: Option<ThrottleSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct DictionarySettings {
    resource: Option<Resource>,
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct HttpSettings {
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ThrottleSettings {
    probability: Option<f64>,
    delay_ms: Option<u64>,
}

/// Where layered settings are looked up: a working directory for
/// `settings.toml`/`settings.local.toml` and an optional per-user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsScope {
    pub cwd: PathBuf,
    pub home: Option<PathBuf>,
}

impl SettingsScope {
    /// The current directory and `$HOME/.mw-ipa`.
    pub fn from_env() -> Self {
        Self {
            cwd: PathBuf::new(),
            home: home_dir(),
        }
    }
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    load_settings_in(&SettingsScope::from_env(), extra_path)
}

pub fn load_settings_in(scope: &SettingsScope, extra_path: Option<&Path>) -> Result<Settings> {
    if let Some(home) = scope.home.as_deref() {
        ensure_home_settings_file(home)?;
    }

    let mut ordered_paths = Vec::new();
    ordered_paths.push(scope.cwd.join("settings.toml"));
    ordered_paths.push(scope.cwd.join("settings.local.toml"));

    if let Some(home) = scope.home.as_deref() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    load_settings_from(&ordered_paths)
}

/// Merges every existing file in `paths` over the defaults, later files winning.
pub fn load_settings_from(paths: &[PathBuf]) -> Result<Settings> {
    let mut settings = Settings::default();
    for path in paths {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }
    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(dictionary) = incoming.dictionary {
            if let Some(resource) = dictionary.resource {
                self.resource = resource;
            }
            if let Some(base_url) = dictionary.base_url {
                if !base_url.trim().is_empty() {
                    self.base_url = base_url.trim().trim_end_matches('/').to_string();
                }
            }
        }
        if let Some(keys) = incoming.keys {
            for (resource, key) in keys {
                if !key.trim().is_empty() {
                    self.keys.insert(resource, key.trim().to_string());
                }
            }
        }
        if let Some(http) = incoming.http {
            if let Some(secs) = http.timeout_secs {
                if secs > 0 {
                    self.timeout = Duration::from_secs(secs);
                }
            }
        }
        if let Some(throttle) = incoming.throttle {
            if let Some(probability) = throttle.probability {
                if (0.0..=1.0).contains(&probability) {
                    self.throttle_probability = probability;
                } else {
                    warn!(
                        "ignoring throttle probability {} (expected 0.0 to 1.0)",
                        probability
                    );
                }
            }
            if let Some(delay) = throttle.delay_ms {
                self.throttle_delay = Duration::from_millis(delay);
            }
        }
    }

    /// API key for `resource`: the explicit key, then `MW_<RESOURCE>_KEY`,
    /// then `MW_API_KEY`, then `[keys]`.
    pub fn resolve_key(&self, resource: Resource, explicit: Option<&str>) -> Option<String> {
        self.resolve_key_with(resource, explicit, |name| std::env::var(name).ok())
    }

    fn resolve_key_with<F>(
        &self,
        resource: Resource,
        explicit: Option<&str>,
        env: F,
    ) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let candidates = [
            explicit.map(str::to_string),
            env(resource.key_env()),
            env(SHARED_KEY_ENV),
            self.keys.get(resource.as_str()).cloned(),
        ];
        candidates
            .into_iter()
            .flatten()
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }
}

fn ensure_home_settings_file(home: &Path) -> Result<()> {
    fs::create_dir_all(home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".mw-ipa"))
        }
    })
}
