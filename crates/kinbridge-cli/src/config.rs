//! Configuration Vault – reads/writes `~/.kinbridge/config.toml`.

use kinbridge_types::AdapterConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted user configuration stored in `~/.kinbridge/config.toml`.
///
/// ```toml
/// rail_position = 0.25
///
/// [adapter]
/// solver_base_frame = "base_link"
/// tolerance = 1e-6
/// seed_states = [[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Position of the rail carrying the gantry, in meters.
    #[serde(default)]
    pub rail_position: f64,

    /// Kinematics adapter tunables.
    #[serde(default)]
    pub adapter: AdapterConfig,
}

/// Return the path to `~/.kinbridge/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".kinbridge").join("config.toml")
}

/// Load the config from `path`, falling back to defaults when the file does
/// not exist.  Environment overrides are applied in both cases.
pub fn load_or_default(path: &Path) -> Result<Config, String> {
    let mut cfg = load_from(path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does not
/// exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `KINBRIDGE_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `KINBRIDGE_BASE_FRAME` | `adapter.solver_base_frame` |
/// | `KINBRIDGE_TIP_FRAME` | `adapter.solver_tip_frame` |
/// | `KINBRIDGE_TOLERANCE` | `adapter.tolerance` |
/// | `KINBRIDGE_RAIL` | `rail_position` |
///
/// Unparseable numbers are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("KINBRIDGE_BASE_FRAME") {
        cfg.adapter.solver_base_frame = Some(v);
    }
    if let Ok(v) = std::env::var("KINBRIDGE_TIP_FRAME") {
        cfg.adapter.solver_tip_frame = Some(v);
    }
    if let Ok(v) = std::env::var("KINBRIDGE_TOLERANCE")
        && let Ok(tolerance) = v.parse::<f64>()
    {
        cfg.adapter.tolerance = tolerance;
    }
    if let Ok(v) = std::env::var("KINBRIDGE_RAIL")
        && let Ok(position) = v.parse::<f64>()
    {
        cfg.rail_position = position;
    }
}

/// Save the config to a specific path, creating the parent directory if
/// necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let mut cfg = Config::default();
        cfg.rail_position = 0.75;
        cfg.adapter.solver_tip_frame = Some("flange".to_string());
        cfg.adapter.seed_states = vec![vec![0.0; 6], vec![1.0; 6]];
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").expect("write");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, Config::default());
        assert_eq!(loaded.adapter.solver_base_frame(), "base_link");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[adapter]\ntolerance = \"tight\"\n").expect("write");
        assert!(load_from(&path).is_err());
    }

    #[test]
    fn config_path_points_to_kinbridge_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".kinbridge"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn apply_env_overrides_changes_frames() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("KINBRIDGE_BASE_FRAME", "rail_carriage") };
        unsafe { std::env::set_var("KINBRIDGE_TIP_FRAME", "flange") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.adapter.solver_base_frame(), "rail_carriage");
        assert_eq!(cfg.adapter.solver_tip_frame(), "flange");
        unsafe { std::env::remove_var("KINBRIDGE_BASE_FRAME") };
        unsafe { std::env::remove_var("KINBRIDGE_TIP_FRAME") };
    }

    #[test]
    fn apply_env_overrides_changes_tolerance() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("KINBRIDGE_TOLERANCE", "1e-4") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.adapter.tolerance, 1e-4);
        unsafe { std::env::remove_var("KINBRIDGE_TOLERANCE") };
    }

    #[test]
    fn apply_env_overrides_changes_rail() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("KINBRIDGE_RAIL", "-0.35") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.rail_position, -0.35);

        // A missing file still picks up the override.
        let dir = tempfile::tempdir().expect("tmp dir");
        let loaded = load_or_default(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(loaded.rail_position, -0.35);
        assert_eq!(loaded.adapter.seed_states, Config::default().adapter.seed_states);

        // Unparseable values leave the field alone.
        unsafe { std::env::set_var("KINBRIDGE_RAIL", "far-left") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.rail_position, 0.0);
        unsafe { std::env::remove_var("KINBRIDGE_RAIL") };
    }
}
