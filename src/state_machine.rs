//! Core session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Menu, Reply, TextFormat};
pub use event::{Command, Event};
pub use state::{AdminMode, MemberMode, Mode, Session};
pub use transition::{transition, TransitionResult};
