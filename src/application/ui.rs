#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::BackendBox;
use crate::domain::models::Event;
use crate::domain::models::PersonaConfig;
use crate::domain::models::PersonaName;
use crate::domain::models::ViewName;
use crate::domain::services::AppState;
use crate::infrastructure::views::ViewManager;

/// Forwards input lines as events. Input always ends with `UserInputClosed`,
/// including when a line can't be read.
fn read_input<R>(reader: R, tx: mpsc::UnboundedSender<Event>) -> JoinHandle<Result<()>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    return tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    tx.send(Event::UserInput(line))?;
                }
                Ok(None) => {
                    break;
                }
                Err(err) => {
                    tracing::error!(error = ?err, "Failed to read input");
                    break;
                }
            }
        }

        tx.send(Event::UserInputClosed())?;
        return Ok(());
    });
}

async fn start_loop(
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    rx: &mut mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut input_closed = false;

    while let Some(event) = rx.recv().await {
        match event {
            Event::BackendPromptResponse(turn, res) => {
                app_state.handle_backend_response(turn, res)?;
            }
            Event::UserInput(text) => {
                let (should_break, should_continue) =
                    app_state.handle_slash_commands(&text, &tx).await?;
                if should_break {
                    break;
                }
                if should_continue {
                    continue;
                }

                app_state.handle_submit(&text, &tx)?;
            }
            Event::UserInputClosed() => {
                input_closed = true;
            }
        }

        // Piped input ends before the last reply lands.
        if input_closed && !app_state.waiting_for_backend {
            break;
        }
    }

    return Ok(());
}

pub async fn start(
    backend: BackendBox,
    tx: mpsc::UnboundedSender<Action>,
    event_tx: mpsc::UnboundedSender<Event>,
    rx: &mut mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let persona_name = Config::get(ConfigKey::Persona);
    let persona = match PersonaName::parse(&persona_name) {
        Some(name) => PersonaConfig::get(name),
        None => bail!(format!("Unknown persona {persona_name}")),
    };

    let view_name = Config::get(ConfigKey::View);
    let view = match ViewName::parse(&view_name) {
        Some(name) => ViewManager::get(
            name,
            &persona.title,
            &Config::get(ConfigKey::Username),
            &Config::get(ConfigKey::TranscriptFile),
        )?,
        None => bail!(format!("Unknown view {view_name}")),
    };

    let mut app_state = AppState::new(persona, view)?;

    if let Err(err) = backend.health_check().await {
        tracing::warn!(error = %err, "Health check failed");
        app_state.notice(&format!(
            "Hey, it looks like I can't reach Gemini with the current configuration. You should double check that before we start talking, otherwise every reply will fail.\n\nError: {err}"
        ))?;
    }

    let reader = read_input(tokio::io::stdin(), event_tx);
    let res = start_loop(&mut app_state, tx, rx).await;
    reader.abort();

    return res;
}
