pub mod favorites;
pub mod fetchxml;
pub mod handler;
pub mod impersonation;
pub mod info;
pub mod navigation;
pub mod palette;
pub mod records;
pub mod ui;

use crate::app::{command::Command, state::AppState};
use crate::domain::protocol::OutboundMessage;

/// Terminal transition: the palette closes first, then the message goes out.
pub(crate) fn finish(state: &mut AppState, message: OutboundMessage) -> Option<Command> {
    debug_assert!(message.is_terminal());
    state.palette = None;
    let wire = message.to_wire();
    tracing::info!(kind = %wire.kind, category = %wire.category, "palette finished");
    Some(Command::Batch(vec![
        Command::CloseSession,
        Command::Send(message),
    ]))
}
