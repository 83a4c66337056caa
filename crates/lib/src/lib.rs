//! Anki Tools core library: AnkiConnect client, card text pipeline, learning session,
//! and the MCP tool surface used by the CLI.

pub mod anki;
pub mod config;
pub mod format;
pub mod server;
pub mod session;
pub mod text;
