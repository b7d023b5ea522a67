#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::models::Action;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;
use crate::domain::models::Event;
use crate::domain::models::TurnId;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /attach (/a) [PATH] - Stages an image file to send along with your next message. Attaching again replaces it.
- /detach (/d) - Drops the staged image.
- /cancel (/c) - Stops waiting on the reply currently in flight.
- /reset (/r) - Clears the conversation and starts over with a fresh greeting.
- /quit /exit (/q) - Exit Verde.
- /help (/h) - Provides this help menu.

SENDING:
Anything that isn't a command is sent as your message, along with the staged image if there is one. Only one message can be waiting on a reply at a time.
        "#;

    return text.trim().to_string();
}

async fn complete(
    backend: BackendBox,
    turn: TurnId,
    prompt: BackendPrompt,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let res = match backend.get_completion(prompt).await {
        Ok(text) => BackendResponse::Completion(text),
        Err(err) => {
            tracing::error!(error = %err, "Completion failed");
            BackendResponse::Failure(err.to_string())
        }
    };

    tx.send(Event::BackendPromptResponse(turn, res))?;
    return Ok(());
}

pub struct ActionsService {}

impl ActionsService {
    /// Runs until every `Action` sender is dropped. Completions run on their
    /// own worker task so they can be aborted mid request.
    pub async fn start(
        backend: BackendBox,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        // Lazy default.
        let mut worker: JoinHandle<Result<()>> = tokio::spawn(async {
            return Ok(());
        });

        while let Some(action) = rx.recv().await {
            match action {
                Action::BackendAbort() => {
                    tracing::info!("Aborting in flight completion");
                    worker.abort();
                }
                Action::BackendRequest(turn, prompt) => {
                    tracing::debug!(
                        turn = turn,
                        messages = prompt.contents.len(),
                        "Requesting completion"
                    );
                    worker = tokio::spawn(complete(backend.clone(), turn, prompt, tx.clone()));
                }
            }
        }

        worker.abort();
        return Ok(());
    }
}
