//! Bridge between the UI thread and the backend worker that talks to the network.

pub mod commands;
pub mod runtime;
