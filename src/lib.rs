//! # sosmed 🌐
//!
//! A terminal client for the FreeAPI social-media service.
//!
//! ## Overview
//!
//! sosmed lets you sign up, log in, read the public feed, like, bookmark and
//! comment on posts, edit your profile and follow other users, all from
//! your terminal. The same API client also backs a small scripting CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          App                                │
//! │  Orchestrates all components and runs the main event loop   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Config      │ │       API       │ │       UI        │
//! │                 │ │                 │ │                 │
//! │ • Load/Save     │ │ • Envelope      │ │ • Render screens│
//! │ • Theme         │ │ • Bearer token  │ │ • Handle input  │
//! │ • Page sizes    │ │ • Uploads       │ │ • Forms         │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │                   │
//!          └───────────────────┴───────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Session     │ │  Query cache    │ │     Models      │
//! │                 │ │                 │ │                 │
//! │ • Encrypted     │ │ • Keyed reads   │ │ • Post, Comment │
//! │ • Token + user  │ │ • Invalidation  │ │ • Profile, User │
//! │ • Route guard   │ │ • Mutations     │ │ • Page          │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] - FreeAPI HTTP client
//! - [`app`] - TUI application state and event loop
//! - [`config`] - Configuration management
//! - [`forms`] - Form fields and validation
//! - [`models`] - Data models (Post, Comment, Profile, User)
//! - [`mutation`] - Write tracking and invalidation rules
//! - [`paths`] - Config and session file locations
//! - [`query`] - Client-side query cache
//! - [`session`] - Encrypted session storage
//! - [`theme`] - Theme support via ratatui-themes
//!
//! ## Example
//!
//! ```no_run
//! use sosmed::{app, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     app::run(Config::load()?)
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/sosmed/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::similar_names)]
#![allow(clippy::if_same_then_else)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::branches_sharing_code)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod app;
pub mod config;
pub mod forms;
pub mod models;
pub mod mutation;
pub mod paths;
pub mod query;
pub mod session;
pub mod theme;

// Re-export main types for convenience
pub use api::{ApiClient, ApiError};
pub use app::AppState;
pub use config::Config;
pub use models::{Comment, FollowEntry, Page, Post, Profile, User};
pub use session::{Session, SessionStore};
pub use theme::{Theme, ThemeColors};

// Re-export theme types from ratatui-themes crate
pub use ratatui_themes::{ThemeName, ThemePalette};

/// ASCII logo for the application
pub const LOGO: &str = r"
                                   _
  ___  ___  ___ _ __ ___   ___  __| |
 / __|/ _ \/ __| '_ ` _ \ / _ \/ _` |
 \__ \ (_) \__ \ | | | | |  __/ (_| |
 |___/\___/|___/_| |_| |_|\___|\__,_|
";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
