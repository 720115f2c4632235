use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_API_URL: &str = "https://localhost:7240/api";
const DEFAULT_LOG_FILE: &str = "exam-client.log";

#[derive(Debug, Clone)]
pub struct Settings {
    api: ApiSettings,
    auth: AuthSettings,
    telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub request_timeout: Duration,
    pub accept_invalid_certs: bool,
}

#[derive(Clone, Default)]
pub struct AuthSettings {
    pub token: Option<String>,
    pub email: Option<String>,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
    pub log_file: PathBuf,
}

/// Values given on the command line; they win over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub email: Option<String>,
    pub insecure: bool,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid api url: {0}")]
    InvalidApiUrl(String),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl Settings {
    /// Reads `EMS_*` variables from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let base_url = env_or_default("EMS_API_URL", DEFAULT_API_URL);
        let request_timeout = parse_u64(
            "EMS_REQUEST_TIMEOUT_SECS",
            env_or_default("EMS_REQUEST_TIMEOUT_SECS", "30"),
        )?;
        let accept_invalid_certs =
            env_optional("EMS_ACCEPT_INVALID_CERTS").map(|value| parse_bool(&value)).unwrap_or(false);

        let token = env_optional("EMS_TOKEN");
        let email = env_optional("EMS_EMAIL");

        let log_level = env_or_default("EMS_LOG_LEVEL", "info");
        let json = env_optional("EMS_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let log_file = PathBuf::from(env_or_default("EMS_LOG_FILE", DEFAULT_LOG_FILE));

        let settings = Self {
            api: ApiSettings {
                base_url,
                request_timeout: Duration::from_secs(request_timeout),
                accept_invalid_certs,
            },
            auth: AuthSettings { token, email },
            telemetry: TelemetrySettings {
                log_level,
                json,
                log_file,
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(api_url) = overrides.api_url {
            self.api.base_url = api_url;
        }
        if overrides.token.is_some() {
            self.auth.token = overrides.token;
        }
        if overrides.email.is_some() {
            self.auth.email = overrides.email;
        }
        if overrides.insecure {
            self.api.accept_invalid_certs = true;
        }
        if let Some(log_file) = overrides.log_file {
            self.telemetry.log_file = log_file;
        }

        self.validate()?;

        Ok(self)
    }

    pub fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub fn auth(&self) -> &AuthSettings {
        &self.auth
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(self.api.base_url.clone()));
        }

        if self.api.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "EMS_REQUEST_TIMEOUT_SECS",
                value: String::from("0"),
            });
        }

        Ok(())
    }
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Settings {
        Settings {
            api: ApiSettings {
                base_url: DEFAULT_API_URL.to_string(),
                request_timeout: Duration::from_secs(30),
                accept_invalid_certs: false,
            },
            auth: AuthSettings::default(),
            telemetry: TelemetrySettings {
                log_level: "info".to_string(),
                json: false,
                log_file: PathBuf::from(DEFAULT_LOG_FILE),
            },
        }
    }

    #[test]
    fn test_parse_bool_variants() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("yes"));
        assert!(parse_bool("ON"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
    }

    #[test]
    fn test_parse_u64_reports_field() {
        let err = parse_u64("EMS_REQUEST_TIMEOUT_SECS", "soon".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for EMS_REQUEST_TIMEOUT_SECS: soon");
    }

    #[test]
    fn test_overrides_win_over_environment_values() {
        let settings = defaults()
            .with_overrides(Overrides {
                api_url: Some("http://10.0.0.5:8084/api".to_string()),
                token: Some("abc".to_string()),
                insecure: true,
                ..Overrides::default()
            })
            .expect("valid overrides");

        assert_eq!(settings.api().base_url, "http://10.0.0.5:8084/api");
        assert_eq!(settings.auth().token.as_deref(), Some("abc"));
        assert!(settings.api().accept_invalid_certs);
        assert_eq!(settings.telemetry().log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_rejects_non_http_api_url() {
        let err = defaults()
            .with_overrides(Overrides {
                api_url: Some("localhost:7240".to_string()),
                ..Overrides::default()
            })
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidApiUrl(_)));
    }

    #[test]
    fn test_auth_debug_hides_token() {
        let auth = AuthSettings {
            token: Some("secret-token".to_string()),
            email: None,
        };
        assert!(!format!("{:?}", auth).contains("secret-token"));
    }
}
