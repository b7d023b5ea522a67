use super::Role;

/// One rendered message. `html` is markup for a single chat bubble.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayBlock {
    pub role: Role,
    pub html: String,
}
