#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use tokio::sync::mpsc;

use super::actions::help_text;
use super::Attachments;
use super::Transcript;
use crate::domain::models::Action;
use crate::domain::models::AttachmentFile;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;
use crate::domain::models::ChatError;
use crate::domain::models::PersonaConfig;
use crate::domain::models::Session;
use crate::domain::models::SlashCommand;
use crate::domain::models::TurnId;
use crate::domain::models::ViewBox;

/// The session-submit boundary. Every user intent goes through here, and every
/// history change ends in a full redraw of the view.
pub struct AppState {
    pub persona: PersonaConfig,
    pub session: Session,
    pub waiting_for_backend: bool,
    /// The most recently dispatched turn. Only its reply is accepted.
    turn: TurnId,
    view: ViewBox,
}

impl AppState {
    pub fn new(persona: PersonaConfig, view: ViewBox) -> Result<AppState> {
        let mut app_state = AppState {
            session: Session::initialize(&persona),
            persona,
            waiting_for_backend: false,
            turn: 0,
            view,
        };

        app_state.redraw()?;
        return Ok(app_state);
    }

    pub fn notice(&mut self, text: &str) -> Result<()> {
        return self.view.notice(text);
    }

    /// Validation failures become notices. Anything else is a real error.
    fn reject(&mut self, err: anyhow::Error) -> Result<()> {
        if let Some(chat_err) = err.downcast_ref::<ChatError>() {
            tracing::debug!(error = %chat_err, "Rejected user input");
            return self.view.notice(&chat_err.to_string());
        }

        return Err(err);
    }

    fn redraw(&mut self) -> Result<()> {
        let blocks = Transcript::render(self.session.history());
        self.view.render(&blocks)?;
        return self.view.scroll_to_latest();
    }

    fn set_waiting(&mut self, waiting: bool) -> Result<()> {
        self.waiting_for_backend = waiting;
        return self.view.set_waiting(waiting);
    }

    /// Returns `(should_break, should_continue)`.
    pub async fn handle_slash_commands(
        &mut self,
        input: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<(bool, bool)> {
        if let Some(command) = SlashCommand::parse(input) {
            if command.is_quit() {
                return Ok((true, false));
            }

            if command.is_help() {
                self.notice(&help_text())?;
            } else if command.is_attach() {
                let file_path = command.arg_text();
                if file_path.is_empty() {
                    self.notice("Pass the path of an image to attach, e.g. /attach ./balcony.jpg")?;
                } else {
                    self.handle_attach(&file_path).await?;
                }
            } else if command.is_detach() {
                self.handle_detach()?;
            } else if command.is_cancel() {
                self.handle_abort(tx)?;
            } else if command.is_reset() {
                self.handle_reset(tx)?;
            }

            return Ok((false, true));
        }

        return Ok((false, false));
    }

    /// Appends the user's message along with any staged image, redraws, then
    /// dispatches the whole history. The reply comes back later through
    /// `handle_backend_response`.
    pub fn handle_submit(&mut self, text: &str, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if self.waiting_for_backend {
            return self.reject(ChatError::Busy.into());
        }

        let attachment = self.session.pending_attachment().cloned();
        if let Err(err) = self.session.append_user_message(Some(text), attachment) {
            return self.reject(err);
        }

        self.handle_detach()?;
        self.redraw()?;
        self.set_waiting(true)?;

        self.turn += 1;
        tx.send(Action::BackendRequest(
            self.turn,
            BackendPrompt::new(self.session.history(), &self.persona),
        ))?;

        return Ok(());
    }

    pub async fn handle_attach(&mut self, file_path: &str) -> Result<()> {
        let file = AttachmentFile::from_path(path::PathBuf::from(file_path));

        match Attachments::attach(&mut self.session, &file).await {
            Ok(preview) => {
                tracing::info!(name = %preview.name, size = preview.size, "Attached image");
                return self.view.set_attachment_preview(Some(&preview));
            }
            Err(err) => {
                return self.reject(err);
            }
        }
    }

    pub fn handle_detach(&mut self) -> Result<()> {
        Attachments::detach(&mut self.session);
        return self.view.set_attachment_preview(None);
    }

    /// Every outcome of a turn, success or not, ends up as exactly one model
    /// message. Replies for cancelled or reset turns are dropped.
    pub fn handle_backend_response(&mut self, turn: TurnId, res: BackendResponse) -> Result<()> {
        if !self.waiting_for_backend || turn != self.turn {
            tracing::debug!(
                turn = turn,
                current = self.turn,
                "Dropping response for a turn that is no longer waiting"
            );
            return Ok(());
        }

        match res {
            BackendResponse::Completion(text) => {
                self.session.append_model_message(&text);
            }
            BackendResponse::Failure(description) => {
                self.session
                    .append_model_message(&ChatError::fallback_text(&description));
            }
        }

        self.set_waiting(false)?;
        return self.redraw();
    }

    pub fn handle_abort(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if !self.waiting_for_backend {
            return self.notice("Nothing to cancel.");
        }

        tx.send(Action::BackendAbort())?;
        self.session
            .append_model_message(&ChatError::Cancelled.to_string());

        self.set_waiting(false)?;
        return self.redraw();
    }

    pub fn handle_reset(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if self.waiting_for_backend {
            tx.send(Action::BackendAbort())?;
            self.set_waiting(false)?;
        }

        self.session.reset(&self.persona);
        self.view.set_attachment_preview(None)?;
        return self.redraw();
    }
}
