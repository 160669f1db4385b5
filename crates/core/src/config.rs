use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub transcription: TranscriptionConfig,
    pub synthesis: SynthesisConfig,
    pub telephony: TelephonyConfig,
    pub agent: AgentConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct TranscriptionConfig {
    pub api_key: Option<SecretString>,
    pub endpoint: String,
    pub sample_rate: u32,
}

#[derive(Clone, Debug)]
pub struct SynthesisConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub voice_id: String,
}

#[derive(Clone, Debug)]
pub struct TelephonyConfig {
    pub account_sid: String,
    pub auth_token: SecretString,
    /// Phone number or SIP target the call is redirected to on handoff.
    pub transfer_destination: String,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub greeting: String,
    pub transfer_notice: String,
    pub menu_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub transcription_api_key: Option<String>,
    pub synthesis_api_key: Option<String>,
    pub telephony_account_sid: Option<String>,
    pub telephony_auth_token: Option<String>,
    pub transfer_destination: Option<String>,
    pub menu_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            llm: LlmConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                timeout_secs: 30,
            },
            transcription: TranscriptionConfig {
                api_key: None,
                endpoint: "wss://api.deepgram.com/v1/listen".to_string(),
                sample_rate: 8_000,
            },
            synthesis: SynthesisConfig {
                api_key: None,
                base_url: "https://api.elevenlabs.io".to_string(),
                voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            },
            telephony: TelephonyConfig {
                account_sid: String::new(),
                auth_token: String::new().into(),
                transfer_destination: String::new(),
            },
            agent: AgentConfig {
                greeting: "Welcome to DineLine Pizza! What would you like to order today?"
                    .to_string(),
                transfer_notice: "One moment, connecting you to a team member.".to_string(),
                menu_path: None,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    llm: Option<LlmPatch>,
    transcription: Option<TranscriptionPatch>,
    synthesis: Option<SynthesisPatch>,
    telephony: Option<TelephonyPatch>,
    agent: Option<AgentPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TranscriptionPatch {
    api_key: Option<String>,
    endpoint: Option<String>,
    sample_rate: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct SynthesisPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    voice_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TelephonyPatch {
    account_sid: Option<String>,
    auth_token: Option<String>,
    transfer_destination: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    greeting: Option<String>,
    transfer_notice: Option<String>,
    menu_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("dineline.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(api_key_value) = llm.api_key {
                self.llm.api_key = Some(api_key_value.into());
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(transcription) = patch.transcription {
            if let Some(api_key_value) = transcription.api_key {
                self.transcription.api_key = Some(api_key_value.into());
            }
            if let Some(endpoint) = transcription.endpoint {
                self.transcription.endpoint = endpoint;
            }
            if let Some(sample_rate) = transcription.sample_rate {
                self.transcription.sample_rate = sample_rate;
            }
        }

        if let Some(synthesis) = patch.synthesis {
            if let Some(api_key_value) = synthesis.api_key {
                self.synthesis.api_key = Some(api_key_value.into());
            }
            if let Some(base_url) = synthesis.base_url {
                self.synthesis.base_url = base_url;
            }
            if let Some(voice_id) = synthesis.voice_id {
                self.synthesis.voice_id = voice_id;
            }
        }

        if let Some(telephony) = patch.telephony {
            if let Some(account_sid) = telephony.account_sid {
                self.telephony.account_sid = account_sid;
            }
            if let Some(auth_token_value) = telephony.auth_token {
                self.telephony.auth_token = auth_token_value.into();
            }
            if let Some(transfer_destination) = telephony.transfer_destination {
                self.telephony.transfer_destination = transfer_destination;
            }
        }

        if let Some(agent) = patch.agent {
            if let Some(greeting) = agent.greeting {
                self.agent.greeting = greeting;
            }
            if let Some(transfer_notice) = agent.transfer_notice {
                self.agent.transfer_notice = transfer_notice;
            }
            if let Some(menu_path) = agent.menu_path {
                self.agent.menu_path = Some(menu_path);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("DINELINE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("DINELINE_SERVER_PORT") {
            self.server.port = parse_u16("DINELINE_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("DINELINE_LLM_API_KEY") {
            self.llm.api_key = Some(value.into());
        }
        if let Some(value) = read_env("DINELINE_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("DINELINE_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("DINELINE_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("DINELINE_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("DINELINE_DEEPGRAM_API_KEY") {
            self.transcription.api_key = Some(value.into());
        }
        if let Some(value) = read_env("DINELINE_DEEPGRAM_ENDPOINT") {
            self.transcription.endpoint = value;
        }

        if let Some(value) = read_env("DINELINE_ELEVENLABS_API_KEY") {
            self.synthesis.api_key = Some(value.into());
        }
        if let Some(value) = read_env("DINELINE_ELEVENLABS_VOICE_ID") {
            self.synthesis.voice_id = value;
        }

        if let Some(value) = read_env("DINELINE_TWILIO_ACCOUNT_SID") {
            self.telephony.account_sid = value;
        }
        if let Some(value) = read_env("DINELINE_TWILIO_AUTH_TOKEN") {
            self.telephony.auth_token = value.into();
        }
        if let Some(value) = read_env("DINELINE_TRANSFER_DESTINATION") {
            self.telephony.transfer_destination = value;
        }

        if let Some(value) = read_env("DINELINE_MENU_PATH") {
            self.agent.menu_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("DINELINE_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("DINELINE_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(llm_api_key.into());
        }
        if let Some(llm_base_url) = overrides.llm_base_url {
            self.llm.base_url = llm_base_url;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(transcription_api_key) = overrides.transcription_api_key {
            self.transcription.api_key = Some(transcription_api_key.into());
        }
        if let Some(synthesis_api_key) = overrides.synthesis_api_key {
            self.synthesis.api_key = Some(synthesis_api_key.into());
        }
        if let Some(account_sid) = overrides.telephony_account_sid {
            self.telephony.account_sid = account_sid;
        }
        if let Some(auth_token) = overrides.telephony_auth_token {
            self.telephony.auth_token = auth_token.into();
        }
        if let Some(transfer_destination) = overrides.transfer_destination {
            self.telephony.transfer_destination = transfer_destination;
        }
        if let Some(menu_path) = overrides.menu_path {
            self.agent.menu_path = Some(menu_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "server.bind_address must not be empty".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port must be greater than zero".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 || self.llm.timeout_secs > 300 {
            return Err(ConfigError::Validation(
                "llm.timeout_secs must be in range 1..=300".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
        }

        if self.transcription.sample_rate == 0 {
            return Err(ConfigError::Validation(
                "transcription.sample_rate must be greater than zero".to_string(),
            ));
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
            return Err(ConfigError::Validation(
                "logging.level must be one of trace|debug|info|warn|error".to_string(),
            ));
        }

        Ok(())
    }

    /// Extra checks the voice server needs beyond what the terminal
    /// simulator needs: provider credentials and a transfer target.
    pub fn validate_for_voice(&self) -> Result<(), ConfigError> {
        let llm_key_missing = self
            .llm
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if llm_key_missing {
            return Err(ConfigError::Validation(
                "llm.api_key is required to run the voice server".to_string(),
            ));
        }

        let stt_key_missing = self
            .transcription
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if stt_key_missing {
            return Err(ConfigError::Validation(
                "transcription.api_key is required to run the voice server".to_string(),
            ));
        }

        let tts_key_missing = self
            .synthesis
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if tts_key_missing {
            return Err(ConfigError::Validation(
                "synthesis.api_key is required to run the voice server".to_string(),
            ));
        }

        if self.telephony.account_sid.trim().is_empty() {
            return Err(ConfigError::Validation(
                "telephony.account_sid is required to run the voice server".to_string(),
            ));
        }
        if self.telephony.auth_token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "telephony.auth_token is required to run the voice server".to_string(),
            ));
        }
        if self.telephony.transfer_destination.trim().is_empty() {
            return Err(ConfigError::Validation(
                "telephony.transfer_destination is required so handoff can redirect the call"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("dineline.toml"), PathBuf::from("config/dineline.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}
