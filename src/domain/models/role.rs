#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Model,
    System,
}

impl Role {
    /// System turns steer the model but never show up in the transcript, and
    /// are never sent as part of `contents`.
    pub fn is_conversational(&self) -> bool {
        return *self == Role::User || *self == Role::Model;
    }
}
