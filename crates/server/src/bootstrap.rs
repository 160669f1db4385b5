use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use dineline_agent::{ConversationEngine, OpenAiChatClient, ToolExecutor};
use dineline_core::config::{AppConfig, ConfigError, LoadOptions};
use dineline_core::domain::menu::Menu;
use dineline_core::errors::MenuError;
use dineline_voice::deepgram::DeepgramTranscription;
use dineline_voice::elevenlabs::ElevenLabsSynthesizer;
use dineline_voice::twilio::TwilioCallControl;
use dineline_voice::{CallRelay, RelayConfig, SessionRegistry};

pub struct Application {
    pub config: AppConfig,
    pub registry: Arc<SessionRegistry>,
    pub relay: Arc<CallRelay>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("menu load failed: {0}")]
    Menu(#[from] MenuError),
    #[error("provider adapter construction failed: {0}")]
    Provider(String),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    config.validate_for_voice()?;

    let menu = match &config.agent.menu_path {
        Some(path) => Menu::load(path)?,
        None => Menu::builtin(),
    };
    info!(
        event_name = "system.bootstrap.menu_loaded",
        items = menu.items().len(),
        source = config.agent.menu_path.as_deref().map(|p| p.display().to_string()).unwrap_or_else(|| "builtin".to_string()),
        "menu loaded"
    );

    let llm = OpenAiChatClient::new(&config.llm)
        .map_err(|error| BootstrapError::Provider(error.to_string()))?;
    let engine =
        Arc::new(ConversationEngine::new(Arc::new(llm), ToolExecutor::new(Arc::new(menu))));

    let transcription = DeepgramTranscription::new(&config.transcription)
        .map_err(|error| BootstrapError::Provider(error.to_string()))?;
    let synthesizer = ElevenLabsSynthesizer::new(&config.synthesis)
        .map_err(|error| BootstrapError::Provider(error.to_string()))?;
    let control = TwilioCallControl::new(&config.telephony);

    let registry = Arc::new(SessionRegistry::new());
    let relay = Arc::new(CallRelay::new(
        registry.clone(),
        engine,
        Arc::new(transcription),
        Arc::new(synthesizer),
        Arc::new(control),
        RelayConfig {
            greeting: config.agent.greeting.clone(),
            transfer_notice: config.agent.transfer_notice.clone(),
            transfer_destination: config.telephony.transfer_destination.clone(),
        },
    ));

    info!(event_name = "system.bootstrap.complete", "application bootstrap complete");

    Ok(Application { config, registry, relay })
}
