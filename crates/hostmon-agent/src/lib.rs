//! Request-serving side of the hostmon agent.
//!
//! A monitoring server connects, sends one key such as
//! `vfs.fs.size[/,free]` and reads back one framed value. Keys are resolved
//! against an [`registry::ItemRegistry`] that is rebuilt from configuration
//! on reload and swapped in atomically.

pub mod config;
pub mod data_source;
pub mod error;
pub mod handler;
pub mod items;
pub mod key;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod source;
