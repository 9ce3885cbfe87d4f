//! Preview server for generated business websites.
//!
//! Serves built sites, exposes the generator over HTTP, and rebuilds with
//! WebSocket live reload when watched files change.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError, SiteRebuilder, RELOAD_PATH};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{ReloadHub, ReloadMessage};
