use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use dotenv::dotenv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

impl FromStr for AppEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(AppEnv::Development),
            "production" => Ok(AppEnv::Production),
            other => bail!("unknown app env: {other}"),
        }
    }
}

/// How the screenshot route checks the submitted URL. `Basic` only requires
/// an `http` prefix; `Strict` requires a well-formed absolute http(s) URL and
/// reports itemized field errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Basic,
    Strict,
}

impl FromStr for ValidationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basic" => Ok(ValidationMode::Basic),
            "strict" => Ok(ValidationMode::Strict),
            other => bail!("unknown validation mode: {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: AppEnv,

    pub port: u16,
    pub api_key: String,
    /// Fixed browser binary, required in production. Development falls back
    /// to chromiumoxide's default discovery.
    pub chrome_executable: Option<PathBuf>,
    pub allowed_origin: String,
    pub validation: ValidationMode,
    pub uploads_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<AppConfig> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source, so tests can assert
    /// defaults and the production gate without mutating process env.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
        let env = match lookup("APP_ENV") {
            Some(value) => value.parse().context("invalid APP_ENV value")?,
            None => AppEnv::default(),
        };

        let port = lookup("PORT")
            .unwrap_or_else(|| 3001.to_string())
            .parse()
            .context("invalid PORT value")?;

        let api_key = lookup("API_KEY").context("API_KEY environment variable is not set")?;

        let chrome_executable = lookup("CHROME_EXECUTABLE_PATH").map(PathBuf::from);
        if env == AppEnv::Production && chrome_executable.is_none() {
            bail!("CHROME_EXECUTABLE_PATH must be set when APP_ENV=production");
        }

        let allowed_origin = lookup("ALLOWED_ORIGIN")
            .unwrap_or_else(|| "https://apply-frame.vercel.app".to_string());

        let validation = match lookup("URL_VALIDATION") {
            Some(value) => value.parse().context("invalid URL_VALIDATION value")?,
            None => ValidationMode::default(),
        };

        let uploads_dir = lookup("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("uploads"));

        Ok(AppConfig {
            env,
            port,
            api_key,
            chrome_executable,
            allowed_origin,
            validation,
            uploads_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_app_env() {
        assert_eq!("development".parse::<AppEnv>().unwrap(), AppEnv::Development);
        assert_eq!("production".parse::<AppEnv>().unwrap(), AppEnv::Production);
        assert!("staging".parse::<AppEnv>().is_err());
    }

    #[test]
    fn parses_validation_mode() {
        assert_eq!(
            "basic".parse::<ValidationMode>().unwrap(),
            ValidationMode::Basic
        );
        assert_eq!(
            "strict".parse::<ValidationMode>().unwrap(),
            ValidationMode::Strict
        );
        assert!("paranoid".parse::<ValidationMode>().is_err());
    }

    #[test]
    fn defaults_are_development_and_basic() {
        assert_eq!(AppEnv::default(), AppEnv::Development);
        assert_eq!(ValidationMode::default(), ValidationMode::Basic);
    }

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn config_applies_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[("API_KEY", "secret")])).unwrap();

        assert_eq!(config.env, AppEnv::Development);
        assert_eq!(config.port, 3001);
        assert_eq!(config.api_key, "secret");
        assert!(config.chrome_executable.is_none());
        assert_eq!(config.allowed_origin, "https://apply-frame.vercel.app");
        assert_eq!(config.validation, ValidationMode::Basic);
        assert_eq!(config.uploads_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn config_requires_an_api_key() {
        assert!(AppConfig::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn production_requires_the_chrome_executable() {
        let missing = AppConfig::from_lookup(lookup_from(&[
            ("API_KEY", "secret"),
            ("APP_ENV", "production"),
        ]));
        assert!(missing.is_err());

        let config = AppConfig::from_lookup(lookup_from(&[
            ("API_KEY", "secret"),
            ("APP_ENV", "production"),
            ("CHROME_EXECUTABLE_PATH", "/usr/bin/chromium"),
        ]))
        .unwrap();
        assert_eq!(config.env, AppEnv::Production);
        assert_eq!(
            config.chrome_executable,
            Some(PathBuf::from("/usr/bin/chromium"))
        );
    }

    #[test]
    fn config_reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("API_KEY", "secret"),
            ("PORT", "8080"),
            ("URL_VALIDATION", "strict"),
            ("ALLOWED_ORIGIN", "https://example.com"),
            ("UPLOADS_DIR", "/tmp/scratch"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.validation, ValidationMode::Strict);
        assert_eq!(config.allowed_origin, "https://example.com");
        assert_eq!(config.uploads_dir, PathBuf::from("/tmp/scratch"));
    }

    #[test]
    fn config_rejects_bad_values() {
        assert!(
            AppConfig::from_lookup(lookup_from(&[("API_KEY", "secret"), ("PORT", "not-a-port")]))
                .is_err()
        );
        assert!(
            AppConfig::from_lookup(lookup_from(&[
                ("API_KEY", "secret"),
                ("URL_VALIDATION", "paranoid"),
            ]))
            .is_err()
        );
    }
}
