use super::BackendPrompt;

/// Identifies one submitted turn. Replies carry it back so a late reply for a
/// cancelled turn can never land on the next one.
pub type TurnId = u64;

#[derive(Debug)]
pub enum Action {
    BackendAbort(),
    BackendRequest(TurnId, BackendPrompt),
}
