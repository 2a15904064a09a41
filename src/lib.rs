//! Interactive OpenRouter chat client for reasoning-capable models.
//!
//! ## Provider bootstrap
//!
//! `REASONING_CHAT_PROVIDER` selects the backend:
//!
//! - `openrouter` (default) reads the API key from `REASONING_CHAT_API_KEY_PATH`
//!   (default `api_key.txt`) and talks to the OpenRouter Responses API.
//! - `mock` runs offline against a deterministic echo provider.
//!
//! Startup lists the zero-cost models from the catalog, asks for one, and then
//! runs a line-oriented conversation. Reasoning traces, reasoning summaries and
//! answers are printed in separate regions. A failed turn prints the error and
//! leaves the conversation history as it was before the turn.
//!
//! Logs go to stderr, filtered by `REASONING_CHAT_LOG` (default `warn`).

pub mod app;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod providers;

pub use app::{run_app, ChatSession};
pub use config::EnvConfig;
pub use error::AppError;
