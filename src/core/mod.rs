//! # Core Application Logic
//!
//! Command execution and dispatch. It knows nothing about any specific UI
//! technology: the view is reached only through the `Transcript` trait.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Executor (shell)     │
//!                    │  • Controller (glue)    │
//!                    │  • Config               │
//!                    │                         │
//!                    │  No UI.                 │
//!                    └───────────┬─────────────┘
//!                                │ Transcript
//!                                ▼
//!                         ┌────────────┐
//!                         │    TUI     │
//!                         │  Adapter   │
//!                         │ (ratatui)  │
//!                         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`executor`]: `Executor` trait, `ShellExecutor`, `CommandResult`
//! - [`controller`]: `Controller` and the `Transcript`/`SubmissionHandler` contracts
//! - [`config`]: `~/.seterm/config.toml` loading and resolution

pub mod config;
pub mod controller;
pub mod executor;
