pub mod actions;
mod app_state;
mod attachments;
mod transcript;

pub use app_state::*;
pub use attachments::*;
pub use transcript::*;
