use super::BackendResponse;
use super::TurnId;

#[derive(Debug)]
pub enum Event {
    BackendPromptResponse(TurnId, BackendResponse),
    UserInput(String),
    UserInputClosed(),
}
