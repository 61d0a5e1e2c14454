//! Algoviz Front Ends
//!
//! Drive the step player from a browser or a terminal.
//!
//! # Architecture
//!
//! - **Workbench**: The session's tree, heap, trie, graph and segment tree;
//!   turns requests into step programs and carries results forward
//! - **REST API**: Start, pause, resume, stop, reset and speed control
//! - **WebSocket**: Streams player events to the page and accepts commands
//! - **Terminal**: A renderer that prints every frame as text
//!
//! # Usage
//!
//! ```ignore
//! let server = VisServer::new(VisConfig::from_env()?)?;
//! server.serve().await?;
//! ```

mod config;
mod error;
mod server;
mod terminal;
mod workbench;

pub use config::{VisConfig, ADDR_VAR, SEED_VAR, SPEED_VAR};
pub use error::{Error, Result};
pub use server::VisServer;
pub use terminal::TerminalRenderer;
pub use workbench::{AlgorithmRequest, Workbench};
