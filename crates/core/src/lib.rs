pub mod domain;
pub mod ingest;
pub mod pipeline;
pub mod sheets;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;
    use std::fmt;
    use std::path::{Path, PathBuf};

    pub const SETTINGS_FILE: &str = ".env";

    const COINGLASS_API_KEY: &str = "COINGLASS_API_KEY";
    const GOOGLE_SHEET_ID: &str = "GOOGLE_SHEET_ID";
    const GOOGLE_SERVICE_ACCOUNT: &str = "GOOGLE_SERVICE_ACCOUNT";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub coinglass_api_key: String,
        pub google_sheet_id: String,
        /// Resolved against the project root and known to exist at load time.
        pub google_service_account: PathBuf,
        pub coinglass_base_url: Option<String>,
        pub coinglass_timeout_secs: Option<u64>,
        pub coinglass_retries: Option<u32>,
        pub sentry_dsn: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ConfigError {
        MissingSettingsFile(PathBuf),
        MissingKeys(Vec<&'static str>),
        CredentialsNotFound(PathBuf),
    }

    impl fmt::Display for ConfigError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::MissingSettingsFile(p) => {
                    write!(f, "{SETTINGS_FILE} not found at {}", p.display())
                }
                Self::MissingKeys(keys) => {
                    write!(f, "missing in {SETTINGS_FILE} -> {}", keys.join(", "))
                }
                Self::CredentialsNotFound(p) => {
                    write!(f, "service account JSON not found at {}", p.display())
                }
            }
        }
    }

    impl std::error::Error for ConfigError {}

    /// `RHODL_PROJECT_ROOT` if set, otherwise the workspace root this crate was built in.
    /// Never derived from the working directory.
    pub fn project_root() -> PathBuf {
        if let Some(root) = std::env::var_os("RHODL_PROJECT_ROOT").filter(|s| !s.is_empty()) {
            return PathBuf::from(root);
        }
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        manifest_dir
            .ancestors()
            .nth(2)
            .unwrap_or(manifest_dir)
            .to_path_buf()
    }

    impl Settings {
        /// Load `<project_root>/.env` into the process environment (existing variables win)
        /// and read the settings from it.
        pub fn load(project_root: &Path) -> anyhow::Result<Self> {
            let env_path = project_root.join(SETTINGS_FILE);
            if !env_path.is_file() {
                return Err(ConfigError::MissingSettingsFile(env_path).into());
            }
            dotenvy::from_path(&env_path)
                .with_context(|| format!("failed to read {}", env_path.display()))?;

            Self::from_lookup(project_root, |key| std::env::var(key).ok())
        }

        pub fn from_lookup<F>(project_root: &Path, lookup: F) -> anyhow::Result<Self>
        where
            F: Fn(&str) -> Option<String>,
        {
            let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

            let api_key = get(COINGLASS_API_KEY);
            let sheet_id = get(GOOGLE_SHEET_ID);
            let service_account = get(GOOGLE_SERVICE_ACCOUNT);

            let missing: Vec<&'static str> = [
                (COINGLASS_API_KEY, api_key.is_none()),
                (GOOGLE_SHEET_ID, sheet_id.is_none()),
                (GOOGLE_SERVICE_ACCOUNT, service_account.is_none()),
            ]
            .into_iter()
            .filter_map(|(key, is_missing)| is_missing.then_some(key))
            .collect();

            let (Some(api_key), Some(sheet_id), Some(service_account)) =
                (api_key, sheet_id, service_account)
            else {
                return Err(ConfigError::MissingKeys(missing).into());
            };

            let service_account_path = resolve_against(project_root, service_account.trim());
            if !service_account_path.exists() {
                return Err(ConfigError::CredentialsNotFound(service_account_path).into());
            }

            Ok(Self {
                coinglass_api_key: api_key.trim().to_string(),
                google_sheet_id: sheet_id.trim().to_string(),
                google_service_account: service_account_path,
                coinglass_base_url: get("COINGLASS_BASE_URL"),
                coinglass_timeout_secs: get("COINGLASS_TIMEOUT_SECS")
                    .and_then(|s| s.trim().parse::<u64>().ok()),
                coinglass_retries: get("COINGLASS_RETRIES")
                    .and_then(|s| s.trim().parse::<u32>().ok()),
                sentry_dsn: get("SENTRY_DSN"),
            })
        }
    }

    fn resolve_against(root: &Path, p: &str) -> PathBuf {
        let path = Path::new(p);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;
        use tempfile::TempDir;

        fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
            let map: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            move |key| map.get(key).cloned()
        }

        fn root_with_service_account() -> TempDir {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("service_account.json"), "{}").unwrap();
            dir
        }

        #[test]
        fn resolves_relative_service_account_against_project_root() {
            let root = root_with_service_account();
            let settings = Settings::from_lookup(
                root.path(),
                lookup(&[
                    ("COINGLASS_API_KEY", "cg"),
                    ("GOOGLE_SHEET_ID", "sheet"),
                    ("GOOGLE_SERVICE_ACCOUNT", "service_account.json"),
                    ("COINGLASS_RETRIES", "5"),
                    ("COINGLASS_TIMEOUT_SECS", "not-a-number"),
                ]),
            )
            .unwrap();

            assert_eq!(settings.coinglass_api_key, "cg");
            assert_eq!(settings.google_sheet_id, "sheet");
            assert_eq!(
                settings.google_service_account,
                root.path().join("service_account.json")
            );
            assert_eq!(settings.coinglass_retries, Some(5));
            assert_eq!(settings.coinglass_timeout_secs, None);
            assert_eq!(settings.sentry_dsn, None);
        }

        #[test]
        fn accepts_absolute_service_account_path() {
            let root = TempDir::new().unwrap();
            let other = root_with_service_account();
            let abs = other.path().join("service_account.json");

            let settings = Settings::from_lookup(
                root.path(),
                lookup(&[
                    ("COINGLASS_API_KEY", "cg"),
                    ("GOOGLE_SHEET_ID", "sheet"),
                    ("GOOGLE_SERVICE_ACCOUNT", abs.to_str().unwrap()),
                ]),
            )
            .unwrap();
            assert_eq!(settings.google_service_account, abs);
        }

        #[test]
        fn lists_every_missing_key() {
            let root = root_with_service_account();
            let err = Settings::from_lookup(
                root.path(),
                lookup(&[("GOOGLE_SHEET_ID", "sheet"), ("GOOGLE_SERVICE_ACCOUNT", "  ")]),
            )
            .unwrap_err();

            let cfg = err.downcast_ref::<ConfigError>().unwrap();
            assert_eq!(
                cfg,
                &ConfigError::MissingKeys(vec!["COINGLASS_API_KEY", "GOOGLE_SERVICE_ACCOUNT"])
            );
            assert!(err.to_string().contains("COINGLASS_API_KEY"));
        }

        #[test]
        fn missing_service_account_file_is_reported() {
            let root = TempDir::new().unwrap();
            let err = Settings::from_lookup(
                root.path(),
                lookup(&[
                    ("COINGLASS_API_KEY", "cg"),
                    ("GOOGLE_SHEET_ID", "sheet"),
                    ("GOOGLE_SERVICE_ACCOUNT", "nope.json"),
                ]),
            )
            .unwrap_err();

            assert_eq!(
                err.downcast_ref::<ConfigError>(),
                Some(&ConfigError::CredentialsNotFound(root.path().join("nope.json")))
            );
        }

        #[test]
        fn missing_settings_file_fails_before_reading_keys() {
            let root = TempDir::new().unwrap();
            let err = Settings::load(root.path()).unwrap_err();
            assert_eq!(
                err.downcast_ref::<ConfigError>(),
                Some(&ConfigError::MissingSettingsFile(root.path().join(".env")))
            );
        }

        #[test]
        fn default_project_root_is_workspace_root() {
            if std::env::var_os("RHODL_PROJECT_ROOT").is_some() {
                return;
            }
            assert!(project_root().join("crates").join("core").is_dir());
        }
    }
}
