use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use dineline_agent::llm::AgentError;
use dineline_agent::session::SessionState;
use dineline_agent::{ConversationEngine, OpenAiChatClient, ToolExecutor};
use dineline_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use dineline_core::domain::menu::Menu;
use dineline_core::domain::transcript::Message;

use crate::Cli;

/// Interactive stdin/stdout loop against the real conversation engine.
/// Mirrors a call: primed policy, spoken greeting, one turn per line, and
/// session end on handoff.
pub async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(LoadOptions {
        config_path: cli.config,
        overrides: ConfigOverrides {
            llm_model: cli.model,
            menu_path: cli.menu,
            ..ConfigOverrides::default()
        },
        ..LoadOptions::default()
    })?;

    let menu = match &config.agent.menu_path {
        Some(path) => Menu::load(path)?,
        None => Menu::builtin(),
    };

    let llm = OpenAiChatClient::new(&config.llm)
        .context("set llm.api_key (or DINELINE_LLM_API_KEY) to run the simulator")?;
    let engine = ConversationEngine::new(Arc::new(llm), ToolExecutor::new(Arc::new(menu)));

    let session_id = uuid::Uuid::new_v4();
    println!("==================================================");
    println!("  DineLine - terminal order simulator");
    println!("  session {session_id}");
    println!("  type 'quit' or 'exit' to stop");
    println!("==================================================");
    println!();

    let mut state = SessionState::default();
    engine.prime(&mut state);
    state.history.push(Message::assistant_text(config.agent.greeting.clone()));
    println!("AI: {}", config.agent.greeting);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!();
        let Some(line) = lines.next_line().await? else {
            println!("Exiting simulator...");
            break;
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit") {
            println!("Exiting simulator...");
            break;
        }

        match engine.run_turn(&mut state, input).await {
            Ok(outcome) => {
                println!("AI: {}", outcome.reply);
                println!("{}", debug_state_line(&state));
            }
            Err(AgentError::ReasoningUnavailable(reason)) => {
                println!("[turn failed: {reason}]");
            }
        }

        if state.order.handoff_requested() {
            println!();
            println!("*** HUMAN HANDOFF INITIATED. SIMULATOR ENDING ***");
            break;
        }
    }

    Ok(())
}

/// One-line cart/total/handoff summary printed after every turn.
fn debug_state_line(state: &SessionState) -> String {
    let cart = state
        .order
        .lines()
        .iter()
        .map(|line| format!("{} x{}", line.item_id, line.quantity))
        .collect::<Vec<_>>()
        .join(", ");
    let cart = if cart.is_empty() { "empty".to_string() } else { cart };

    format!(
        "[state] cart: {} | total: ${:.2} | handoff: {}",
        cart,
        state.order.total(),
        state.order.handoff_requested()
    )
}
