//! # RadioBar Configuration Module
//!
//! This module provides configuration management for RadioBar, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use rbconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let quality = config.get_audio_quality();
//! let history = config.get_history_size();
//!
//! // Update configuration values
//! config.set_history_size(10)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("radiobar.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load RadioBar configuration"));
}

const ENV_CONFIG_DIR: &str = "RADIOBAR_CONFIG";
const ENV_PREFIX: &str = "RADIOBAR_CONFIG__";

// Default values for configuration
const DEFAULT_SORT_ORDER: &str = "quickmix-name";
const DEFAULT_AUDIO_QUALITY: &str = "high";
const DEFAULT_GAIN_MULTIPLIER: f64 = 1.0;
const DEFAULT_MAX_PLAYER_ERRORS: usize = 5;
const DEFAULT_HISTORY_SIZE: usize = 5;
const DEFAULT_SUBSCRIPTIONS: &str =
    "userlogin,usergetstations,stationfetchplaylist,songstart,songfinish";
const DEFAULT_BASE_URL: &str = "https://tuner.radiobar.net/api/v1";
const DEFAULT_TIMEOUT_SECS: usize = 30;
const DEFAULT_DEVICE: &str = "console";

/// Macro to generate getter/setter for usize values with default
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> usize {
            match self.get_value($path) {
                Ok(Value::Number(n)) if n.is_i64() => n.as_i64().unwrap() as usize,
                Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap() as usize,
                _ => $default,
            }
        }

        pub fn $setter(&self, size: usize) -> Result<()> {
            let n = Number::from(size);
            self.set_value($path, Value::Number(n))
        }
    };
}

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> bool {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => b,
                _ => $default,
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Macro to generate a getter for string values with default
macro_rules! impl_string_config {
    ($getter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.is_empty() => s,
                _ => $default.to_string(),
            }
        }
    };
}

/// Macro to generate a getter for optional string values (absent or empty
/// means None)
macro_rules! impl_opt_string_config {
    ($getter:ident, $path:expr) => {
        pub fn $getter(&self) -> Option<String> {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.is_empty() => Some(s),
                _ => None,
            }
        }
    };
}

/// Configuration manager for RadioBar
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

// Implémentation manuelle de Clone
impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.data.lock().unwrap().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(".radiobar").exists() {
            return ".radiobar".to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(".radiobar");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        // Default fallback
        ".radiobar".to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        // Create if doesn't exist
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        // Verify it's a directory
        if !path.is_dir() {
            return Err(anyhow!("Le chemin spécifié n'est pas un répertoire"));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `RADIOBAR_CONFIG` environment variable
    /// 3. `.radiobar` in the current directory
    /// 4. `.radiobar` in the user's home directory
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created or validated
    pub fn config_dir(directory: &str) -> String {
        let dir_path = Self::find_config_dir(directory);
        let path = Path::new(&dir_path);

        Self::validate_config_dir(path)
            .expect("Impossible de valider le répertoire de configuration");

        dir_path
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        // Obtenir le répertoire de configuration
        let config_dir = Self::config_dir(directory);
        info!(config_dir = %config_dir, "Using config directory");

        // Construire le chemin du fichier config.yaml
        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        // Charger la configuration par défaut
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        // Essayer de charger le fichier de configuration
        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file = %path, "Loaded config file");
            data
        } else {
            info!(config_file = %path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Merger avec la config par défaut
        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = Self::lower_keys_value(default_value);

        // Appliquer les overrides depuis les variables d'environnement
        Self::apply_env_overrides(&mut config_value);

        // Créer la configuration
        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        // Sauvegarder la configuration
        config.save()?;
        Ok(config)
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["network", "base_url"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        Self::set_value_internal(&mut data, path, value)?;
        drop(data);
        self.save()?;
        Ok(())
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = path[0].to_lowercase();
            let key_value = Value::String(key);
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();

                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                let key_path = key
                    .trim_start_matches(ENV_PREFIX)
                    .split("__")
                    .collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        let new_key = Value::String(s.to_lowercase());
                        let new_val = Self::lower_keys_value(v);
                        new_map.insert(new_key, new_val);
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    // ============ User / credentials ============

    /// Récupère les credentials configurés (absents si non renseignés)
    pub fn get_credentials(&self) -> (Option<String>, Option<String>) {
        (self.get_username(), self.get_password())
    }

    impl_opt_string_config!(get_username, &["user", "name"]);
    impl_opt_string_config!(get_password, &["user", "password"]);
    impl_opt_string_config!(get_password_command, &["user", "password_command"]);

    pub fn set_username(&self, username: &str) -> Result<()> {
        self.set_value(&["user", "name"], Value::String(username.to_string()))
    }

    // ============ Station / playback ============

    impl_opt_string_config!(get_autostart_station, &["station", "autostart"]);
    impl_string_config!(get_sort_order, &["station", "sort_order"], DEFAULT_SORT_ORDER);

    impl_bool_config!(
        get_autoselect,
        set_autoselect,
        &["station", "autoselect"],
        true
    );

    impl_string_config!(
        get_audio_quality,
        &["playback", "audio_quality"],
        DEFAULT_AUDIO_QUALITY
    );

    /// Multiplicateur appliqué au gain par morceau avant envoi au player
    pub fn get_gain_multiplier(&self) -> f64 {
        match self.get_value(&["playback", "gain_multiplier"]) {
            Ok(Value::Number(n)) => n.as_f64().unwrap_or(DEFAULT_GAIN_MULTIPLIER),
            _ => DEFAULT_GAIN_MULTIPLIER,
        }
    }

    impl_usize_config!(
        get_max_player_errors,
        set_max_player_errors,
        &["playback", "max_player_errors"],
        DEFAULT_MAX_PLAYER_ERRORS
    );

    impl_usize_config!(
        get_history_size,
        set_history_size,
        &["playback", "history_size"],
        DEFAULT_HISTORY_SIZE
    );

    impl_string_config!(
        get_player_command,
        &["playback", "player_command"],
        "mpv"
    );

    // ============ Events ============

    impl_opt_string_config!(get_event_command, &["events", "command"]);
    impl_string_config!(
        get_event_subscriptions,
        &["events", "subscriptions"],
        DEFAULT_SUBSCRIPTIONS
    );

    // ============ Network ============

    impl_string_config!(get_base_url, &["network", "base_url"], DEFAULT_BASE_URL);
    impl_string_config!(get_device, &["network", "device"], DEFAULT_DEVICE);

    impl_usize_config!(
        get_timeout_secs,
        set_timeout_secs,
        &["network", "timeout_secs"],
        DEFAULT_TIMEOUT_SECS
    );

    // ============ Display formats ============

    impl_string_config!(
        get_nowplaying_song_format,
        &["format", "nowplaying_song"],
        "\"%t\" by \"%a\" on \"%l\"%r%@%s"
    );
    impl_string_config!(
        get_nowplaying_station_format,
        &["format", "nowplaying_station"],
        "Station \"%n\""
    );
    impl_string_config!(
        get_list_song_format,
        &["format", "list_song"],
        "%i) %a - %t%r %d%@%s"
    );
    impl_string_config!(get_time_format, &["format", "time"], "%s%r/%t");

    impl_string_config!(get_love_icon, &["format", "love_icon"], " <3");
    impl_string_config!(get_ban_icon, &["format", "ban_icon"], " </3");
    impl_string_config!(get_tired_icon, &["format", "tired_icon"], " zZ");
    impl_string_config!(get_at_icon, &["format", "at_icon"], " @ ");

    /// Préfixe affiché devant les messages du type donné (info, error, ...)
    pub fn get_msg_prefix(&self, kind: &str) -> String {
        match self.get_value(&["format", "msg_prefixes", kind]) {
            Ok(Value::String(s)) => s,
            _ => String::new(),
        }
    }

    // ============ Paths ============

    /// Path of the state file written at shutdown
    pub fn state_file_path(&self) -> PathBuf {
        Path::new(&self.config_dir).join("state.yaml")
    }
}

/// Returns the global configuration instance
///
/// This function provides access to the singleton configuration instance,
/// which is lazily loaded on first access.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merges external YAML configuration into default configuration
///
/// This function recursively merges two YAML value trees:
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in_temp_dir() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn defaults_are_available_without_config_file() {
        let (_dir, config) = config_in_temp_dir();
        assert_eq!(config.get_history_size(), 5);
        assert_eq!(config.get_audio_quality(), "high");
        assert_eq!(config.get_sort_order(), "quickmix-name");
        assert!(config.get_event_command().is_none());
        assert!(config.get_username().is_none());
        assert!(config
            .get_event_subscriptions()
            .split(',')
            .any(|e| e == "songstart"));
    }

    #[test]
    fn set_and_get_roundtrip() {
        let (_dir, config) = config_in_temp_dir();
        config.set_history_size(12).unwrap();
        assert_eq!(config.get_history_size(), 12);

        config
            .set_value(&["events", "command"], Value::String("notify".into()))
            .unwrap();
        assert_eq!(config.get_event_command().as_deref(), Some("notify"));
    }

    #[test]
    fn external_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "playback:\n  history_size: 2\nuser:\n  name: someone@example.net\n",
        )
        .unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.get_history_size(), 2);
        assert_eq!(config.get_username().as_deref(), Some("someone@example.net"));
        // untouched keys keep their embedded defaults
        assert_eq!(config.get_max_player_errors(), 5);
    }

    #[test]
    fn saved_file_reloads_identically() {
        let dir = TempDir::new().unwrap();
        {
            let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
            config.set_username("kept@example.net").unwrap();
        }
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.get_username().as_deref(), Some("kept@example.net"));
    }

    #[test]
    fn state_file_lives_in_config_dir() {
        let (dir, config) = config_in_temp_dir();
        assert_eq!(config.state_file_path(), dir.path().join("state.yaml"));
    }
}
