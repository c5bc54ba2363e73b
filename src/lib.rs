//! Photoshoot takeout — delivery workflow core.
//!
//! Two pipelines share one roster format: `organize` stages the raw frames
//! clients selected into a fresh folder, and `dispatch` mails each client
//! their edited picks (or serializes the messages in a dry run).

pub mod cli;
pub mod dispatch;
pub mod error;
pub mod mail;
pub mod naming;
pub mod organize;
pub mod prompt;
pub mod roster;
pub mod staging;
