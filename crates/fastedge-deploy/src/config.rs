//! Deployment configuration.
//!
//! Raw inputs arrive as strings (from flags or `INPUT_*` variables) and are
//! validated into a deploy config once, before any network call.

use crate::error::{Error, Result};
use crate::inputs::{desired_secret_slots, parse_dictionary, parse_secret_refs};
use crate::report::Reporter;
use fastedge_api::{ApiConfig, AppResource, SecretResource};
use std::path::PathBuf;

/// Raw inputs of an application deployment.
#[derive(Debug, Clone, Default)]
pub struct AppInputs {
    pub api_key: String,
    pub api_url: String,
    pub wasm_file: String,
    pub app_name: String,
    pub app_id: String,
    pub comment: String,
    pub env: String,
    pub rsp_headers: String,
    pub secrets: String,
}

/// Raw inputs of a secret deployment.
#[derive(Debug, Clone, Default)]
pub struct SecretInputs {
    pub api_key: String,
    pub api_url: String,
    pub secret_name: String,
    pub secret_id: String,
    pub comment: String,
    pub secret: String,
    pub secret_slots: String,
}

/// Validated application deployment.
#[derive(Debug, Clone)]
pub struct AppDeployConfig {
    pub api: ApiConfig,
    pub wasm_file: PathBuf,
    /// Explicit application id, if one was supplied.
    pub app_id: Option<u64>,
    /// Desired application without its binary.
    pub app: AppResource,
}

impl AppDeployConfig {
    pub fn from_inputs(inputs: &AppInputs, reporter: &dyn Reporter) -> Result<Self> {
        require(&[
            ("api_key", &inputs.api_key),
            ("api_url", &inputs.api_url),
            ("wasm_file", &inputs.wasm_file),
            ("app_name", &inputs.app_name),
        ])?;
        let app_id = parse_id("app_id", &inputs.app_id)?;

        let app = AppResource {
            name: inputs.app_name.trim().to_string(),
            status: 1,
            binary: 0,
            env: parse_dictionary("env", &inputs.env, reporter),
            rsp_headers: parse_dictionary("rsp_headers", &inputs.rsp_headers, reporter),
            secrets: parse_secret_refs(&inputs.secrets, reporter),
            comment: inputs.comment.trim().to_string(),
            api_type: None,
        };

        Ok(Self {
            api: ApiConfig::new(inputs.api_url.trim(), inputs.api_key.trim()),
            wasm_file: PathBuf::from(inputs.wasm_file.trim()),
            app_id,
            app,
        })
    }

    /// The create/update payload pointing at `binary`.
    pub fn resource(&self, binary: u64) -> AppResource {
        AppResource {
            binary,
            ..self.app.clone()
        }
    }
}

/// Validated secret deployment.
#[derive(Debug, Clone)]
pub struct SecretDeployConfig {
    pub api: ApiConfig,
    /// Explicit secret id, if one was supplied.
    pub secret_id: Option<u64>,
    /// Desired secret. Never has an empty slot list.
    pub secret: SecretResource,
}

impl SecretDeployConfig {
    pub fn from_inputs(inputs: &SecretInputs, reporter: &dyn Reporter) -> Result<Self> {
        require(&[
            ("api_key", &inputs.api_key),
            ("api_url", &inputs.api_url),
            ("secret_name", &inputs.secret_name),
        ])?;
        let secret_id = parse_id("secret_id", &inputs.secret_id)?;

        let secret_slots =
            desired_secret_slots(&inputs.secret_slots, inputs.secret.trim(), reporter);
        if secret_slots.is_empty() {
            return Err(Error::NoSecretSlots);
        }

        Ok(Self {
            api: ApiConfig::new(inputs.api_url.trim(), inputs.api_key.trim()),
            secret_id,
            secret: SecretResource {
                name: inputs.secret_name.trim().to_string(),
                comment: inputs.comment.trim().to_string(),
                secret_slots,
            },
        })
    }
}

fn require(fields: &[(&'static str, &String)]) -> Result<()> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingInputs(missing))
    }
}

/// Empty and `0` both mean "not supplied".
fn parse_id(name: &'static str, raw: &str) -> Result<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<u64>() {
        Ok(0) => Ok(None),
        Ok(id) => Ok(Some(id)),
        Err(_) => Err(Error::InvalidInput {
            name,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;
    use fastedge_api::{AppSecret, SecretSlot};

    fn app_inputs() -> AppInputs {
        AppInputs {
            api_key: "key".to_string(),
            api_url: "https://api.example.com/".to_string(),
            wasm_file: "dist/app.wasm".to_string(),
            app_name: "my-app".to_string(),
            ..Default::default()
        }
    }

    fn secret_inputs() -> SecretInputs {
        SecretInputs {
            api_key: "key".to_string(),
            api_url: "https://api.example.com".to_string(),
            secret_name: "db-password".to_string(),
            secret: "hunter2".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_app_config_from_inputs() {
        let reporter = RecordingReporter::new();
        let inputs = AppInputs {
            app_id: " 789 ".to_string(),
            comment: "deployed by ci".to_string(),
            env: r#"{"MODE": "prod"}"#.to_string(),
            secrets: r#"{"TOKEN": {"id": 3}}"#.to_string(),
            ..app_inputs()
        };

        let config = AppDeployConfig::from_inputs(&inputs, &reporter).unwrap();
        assert_eq!(config.api.api_url, "https://api.example.com");
        assert_eq!(config.wasm_file, PathBuf::from("dist/app.wasm"));
        assert_eq!(config.app_id, Some(789));

        let resource = config.resource(55);
        assert_eq!(resource.name, "my-app");
        assert_eq!(resource.status, 1);
        assert_eq!(resource.binary, 55);
        assert_eq!(resource.comment, "deployed by ci");
        assert_eq!(resource.env.get("MODE").map(String::as_str), Some("prod"));
        assert!(resource.rsp_headers.is_empty());
        assert_eq!(resource.secrets.get("TOKEN"), Some(&AppSecret::from_id(3)));
        assert!(reporter.events().is_empty());
    }

    #[test]
    fn test_missing_inputs_are_all_named() {
        let reporter = RecordingReporter::new();
        let inputs = AppInputs {
            api_key: String::new(),
            app_name: "   ".to_string(),
            ..app_inputs()
        };

        let err = AppDeployConfig::from_inputs(&inputs, &reporter).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Mandatory inputs are missing: api_key, app_name"
        );
    }

    #[test]
    fn test_app_id_zero_or_empty_is_not_supplied() {
        let reporter = RecordingReporter::new();
        for raw in ["", "0", "  "] {
            let inputs = AppInputs {
                app_id: raw.to_string(),
                ..app_inputs()
            };
            let config = AppDeployConfig::from_inputs(&inputs, &reporter).unwrap();
            assert_eq!(config.app_id, None, "app_id {:?}", raw);
        }
    }

    #[test]
    fn test_non_numeric_app_id_is_rejected() {
        let reporter = RecordingReporter::new();
        let inputs = AppInputs {
            app_id: "abc".to_string(),
            ..app_inputs()
        };
        assert!(matches!(
            AppDeployConfig::from_inputs(&inputs, &reporter),
            Err(Error::InvalidInput { name: "app_id", .. })
        ));
    }

    #[test]
    fn test_malformed_dictionaries_degrade_with_warnings() {
        let reporter = RecordingReporter::new();
        let inputs = AppInputs {
            env: "not json".to_string(),
            rsp_headers: "[1]".to_string(),
            ..app_inputs()
        };

        let config = AppDeployConfig::from_inputs(&inputs, &reporter).unwrap();
        assert!(config.app.env.is_empty());
        assert!(config.app.rsp_headers.is_empty());
        assert_eq!(reporter.warnings().len(), 2);
    }

    #[test]
    fn test_secret_config_from_inputs() {
        let reporter = RecordingReporter::new();
        let config = SecretDeployConfig::from_inputs(&secret_inputs(), &reporter).unwrap();
        assert_eq!(config.secret_id, None);
        assert_eq!(config.secret.name, "db-password");
        assert_eq!(config.secret.comment, "");
        assert_eq!(
            config.secret.secret_slots,
            vec![SecretSlot::upsert(0, "hunter2")]
        );
    }

    #[test]
    fn test_secret_config_prefers_slots() {
        let reporter = RecordingReporter::new();
        let inputs = SecretInputs {
            secret_id: "12".to_string(),
            secret_slots: r#"[{"slot": 1, "value": "a"}]"#.to_string(),
            ..secret_inputs()
        };
        let config = SecretDeployConfig::from_inputs(&inputs, &reporter).unwrap();
        assert_eq!(config.secret_id, Some(12));
        assert_eq!(config.secret.secret_slots, vec![SecretSlot::upsert(1, "a")]);
    }

    #[test]
    fn test_secret_config_without_slots_fails() {
        let reporter = RecordingReporter::new();
        let inputs = SecretInputs {
            secret: String::new(),
            secret_slots: "[]".to_string(),
            ..secret_inputs()
        };
        let err = SecretDeployConfig::from_inputs(&inputs, &reporter).unwrap_err();
        assert!(matches!(err, Error::NoSecretSlots));
        assert_eq!(reporter.warnings(), vec!["No secret_slots provided.".to_string()]);
    }

    #[test]
    fn test_secret_missing_inputs_checked_first() {
        let reporter = RecordingReporter::new();
        let inputs = SecretInputs {
            api_url: String::new(),
            secret: String::new(),
            ..secret_inputs()
        };
        let err = SecretDeployConfig::from_inputs(&inputs, &reporter).unwrap_err();
        assert_eq!(err.to_string(), "Mandatory inputs are missing: api_url");
        assert!(reporter.warnings().is_empty());
    }
}
