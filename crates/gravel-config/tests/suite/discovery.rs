use std::ffi::OsString;
use std::sync::Mutex;

use gravel_config::{discover_config_path, load_for_dir, GravelConfig, GRAVEL_CONFIG_ENV_VAR};
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: &std::path::Path) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_gravel_toml_in_directory() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(GRAVEL_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let path = dir.path().join("gravel.toml");
    std::fs::write(&path, "[parser]\nsll_first = false\n").unwrap();

    assert_eq!(discover_config_path(dir.path()), Some(path.clone()));
    let (config, found) = load_for_dir(dir.path()).unwrap();
    assert_eq!(found, Some(path));
    assert!(!config.parser.sll_first);
}

#[test]
fn prefers_gravel_toml_over_dotfile() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(GRAVEL_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(".gravel.toml"), "").unwrap();
    assert_eq!(
        discover_config_path(dir.path()),
        Some(dir.path().join(".gravel.toml"))
    );

    std::fs::write(dir.path().join("gravel.toml"), "").unwrap();
    assert_eq!(
        discover_config_path(dir.path()),
        Some(dir.path().join("gravel.toml"))
    );
}

#[test]
fn missing_config_falls_back_to_defaults() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(GRAVEL_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let (config, found) = load_for_dir(dir.path()).unwrap();
    assert_eq!(found, None);
    assert_eq!(config, GravelConfig::default());
}

#[test]
fn env_var_overrides_discovery() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("gravel.toml"), "").unwrap();
    let custom = dir.path().join("custom.toml");
    std::fs::write(&custom, "[logging]\nlevel = \"trace\"\n").unwrap();
    let _env = EnvVarGuard::set(GRAVEL_CONFIG_ENV_VAR, &custom);

    let (config, found) = load_for_dir(dir.path()).unwrap();
    assert_eq!(found, Some(custom));
    assert_eq!(config.logging.level, "trace");
}
