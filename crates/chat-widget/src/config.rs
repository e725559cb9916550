// Configuration loading and parsing (config/chat.toml).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Name of the single config file under `config/` (and `defaults/`).
pub const CONFIG_FILE: &str = "chat.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub endpoint: EndpointConfig,
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub request: RequestParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Full URL the conversation is POSTed to.
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// System turn that opens every conversation.
    pub greeting: String,
    /// Generic text shown in the thread when a request fails.
    pub error_notice: String,
}

/// Optional parameters forwarded in the request body alongside `messages`.
/// Unset fields are left out of the body entirely so the endpoint applies
/// its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RequestParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Parse and validate a config from TOML text. `path` is only used for
/// error reporting.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load and validate `config/chat.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()`.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

/// Make sure `config/chat.toml` exists, seeding it from
/// `defaults/chat.toml` on first run.
///
/// Returns the path written, or `None` when the user's file was already
/// there. An existing `config/chat.toml` is never touched.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.is_file() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no config/{CONFIG_FILE} or defaults/{CONFIG_FILE} under {}; \
                 run from the crate root",
                base_dir.display()
            ),
        });
    }

    if let Some(config_dir) = target.parent() {
        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", config_dir.display()),
        })?;
    }
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!(
            "failed to copy {} to {}: {e}",
            source.display(),
            target.display()
        ),
    })?;

    Ok(Some(target))
}

/// Load config relative to the current working directory, seeding
/// `config/` from `defaults/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = reqwest::Url::parse(&config.endpoint.url)
        .map_err(|e| invalid("endpoint.url", format!("not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            "endpoint.url",
            format!("scheme must be http or https, got {}", url.scheme()),
        ));
    }

    if config.conversation.greeting.trim().is_empty() {
        return Err(invalid("conversation.greeting", "must not be empty"));
    }
    if config.conversation.error_notice.trim().is_empty() {
        return Err(invalid("conversation.error_notice", "must not be empty"));
    }

    let request = &config.request;
    if request.provider.as_deref().is_some_and(|p| p.trim().is_empty()) {
        return Err(invalid("request.provider", "must not be empty when set"));
    }
    if request.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
        return Err(invalid("request.model", "must not be empty when set"));
    }
    if let Some(temperature) = request.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(invalid(
                "request.temperature",
                format!("must be between 0.0 and 2.0 inclusive, got {temperature}"),
            ));
        }
    }
    if request.max_tokens == Some(0) {
        return Err(invalid("request.max_tokens", "must be > 0"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: returns the crate root (works whether `cargo test` runs from
    /// the crate root or the workspace root).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/chat-widget/defaults").exists() {
            cwd.join("crates/chat-widget")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    const MINIMAL: &str = r#"
[endpoint]
url = "https://chat.example.com/prod/chat"

[conversation]
greeting = "Hi!"
error_notice = "Something went wrong."
"#;

    fn parse(text: &str) -> Result<Config, ConfigError> {
        parse_config(text, Path::new("chat.toml"))
    }

    fn expect_field(err: ConfigError, expected: &str) {
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_default_config_from_project_files() {
        let root = project_root();
        let path = root.join("defaults").join(CONFIG_FILE);
        let text = fs::read_to_string(&path).unwrap();
        let config = parse_config(&text, &path).expect("defaults should be valid");

        assert_eq!(
            config.endpoint.url,
            "https://bdoez5u93k.execute-api.us-east-1.amazonaws.com/prod/chat"
        );
        assert_eq!(
            config.conversation.greeting,
            "Hello! I'm an AI assistant. How can I help you today?"
        );
        assert_eq!(
            config.conversation.error_notice,
            "Sorry, there was an error processing your request. Please try again."
        );
        assert_eq!(config.request, RequestParams::default());
    }

    #[test]
    fn request_section_is_optional() {
        let config = parse(MINIMAL).unwrap();
        assert!(config.request.model.is_none());
        assert!(config.request.provider.is_none());
        assert!(config.request.temperature.is_none());
        assert!(config.request.max_tokens.is_none());
    }

    #[test]
    fn request_section_parses_all_fields() {
        let text = format!(
            "{MINIMAL}\n[request]\nprovider = \"openai\"\nmodel = \"gpt-3.5-turbo\"\ntemperature = 0.7\nmax_tokens = 1000\n"
        );
        let config = parse(&text).unwrap();
        assert_eq!(config.request.provider.as_deref(), Some("openai"));
        assert_eq!(config.request.model.as_deref(), Some("gpt-3.5-turbo"));
        assert_eq!(config.request.temperature, Some(0.7));
        assert_eq!(config.request.max_tokens, Some(1000));
    }

    #[test]
    fn rejects_unparseable_url() {
        let text = MINIMAL.replace("https://chat.example.com/prod/chat", "not a url");
        expect_field(parse(&text).unwrap_err(), "endpoint.url");
    }

    #[test]
    fn rejects_non_http_scheme() {
        let text = MINIMAL.replace("https://", "ftp://");
        expect_field(parse(&text).unwrap_err(), "endpoint.url");
    }

    #[test]
    fn rejects_blank_greeting() {
        let text = MINIMAL.replace("greeting = \"Hi!\"", "greeting = \"   \"");
        expect_field(parse(&text).unwrap_err(), "conversation.greeting");
    }

    #[test]
    fn rejects_blank_error_notice() {
        let text = MINIMAL.replace(
            "error_notice = \"Something went wrong.\"",
            "error_notice = \"\"",
        );
        expect_field(parse(&text).unwrap_err(), "conversation.error_notice");
    }

    #[test]
    fn rejects_temperature_out_of_range() {
        let text = format!("{MINIMAL}\n[request]\ntemperature = 2.5\n");
        expect_field(parse(&text).unwrap_err(), "request.temperature");
    }

    #[test]
    fn rejects_zero_max_tokens() {
        let text = format!("{MINIMAL}\n[request]\nmax_tokens = 0\n");
        expect_field(parse(&text).unwrap_err(), "request.max_tokens");
    }

    #[test]
    fn rejects_empty_model() {
        let text = format!("{MINIMAL}\n[request]\nmodel = \"\"\n");
        expect_field(parse(&text).unwrap_err(), "request.model");
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let err = parse("this is not valid [[[ toml").unwrap_err();
        match err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("chat.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
    }

    #[test]
    fn parse_error_for_missing_section() {
        let err = parse("[endpoint]\nurl = \"https://a.example\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn file_not_found_for_missing_chat_toml() {
        let tmp = std::env::temp_dir().join("chat_config_test_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("chat.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_seeds_from_defaults() {
        let tmp = std::env::temp_dir().join("chat_config_test_seed");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), MINIMAL).unwrap();

        let written = ensure_config_file(&tmp).expect("should seed");
        assert_eq!(written, Some(tmp.join("config").join(CONFIG_FILE)));

        let config = load_config_from(&tmp).expect("seeded config should load");
        assert_eq!(config.conversation.greeting, "Hi!");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_keeps_user_config() {
        let tmp = std::env::temp_dir().join("chat_config_test_keep");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), MINIMAL).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), "# custom\n").unwrap();

        assert_eq!(ensure_config_file(&tmp).unwrap(), None);
        let content = fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_without_defaults_is_ok_when_config_exists() {
        let tmp = std::env::temp_dir().join("chat_config_test_no_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), MINIMAL).unwrap();

        assert_eq!(ensure_config_file(&tmp).unwrap(), None);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_errors_when_nothing_to_seed_from() {
        let tmp = std::env::temp_dir().join("chat_config_test_nothing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_file(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("defaults/chat.toml"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }
        assert!(!tmp.join("config").exists());

        let _ = fs::remove_dir_all(&tmp);
    }
}
