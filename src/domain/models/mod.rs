mod action;
mod attachment;
mod backend;
mod display;
mod error;
mod event;
mod message;
mod persona;
mod role;
mod session;
mod slash_commands;
mod view;

pub use action::*;
pub use attachment::*;
pub use backend::*;
pub use display::*;
pub use error::*;
pub use event::*;
pub use message::*;
pub use persona::*;
pub use role::*;
pub use session::*;
pub use slash_commands::*;
pub use view::*;
