use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Application-level constants
pub const APP_NAME: &str = "Adhera";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default log filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,adhera=debug"
}

/// Install the default tracing subscriber (env-filtered, compact output).
///
/// Embedders that install their own subscriber can skip this. Calling it
/// more than once is harmless; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .try_init();
}

/// Get the application data directory
/// ~/Adhera/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Adhera")
}

/// Default location of the durable collection store.
pub fn default_store_path() -> PathBuf {
    app_data_dir().join("adhera.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Adhera"));
    }

    #[test]
    fn store_path_under_app_data() {
        let path = default_store_path();
        assert!(path.starts_with(app_data_dir()));
        assert!(path.ends_with("adhera.db"));
    }

    #[test]
    fn app_name_is_adhera() {
        assert_eq!(APP_NAME, "Adhera");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }
}
