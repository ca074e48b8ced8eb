//! # FAQ Navigation Core
//!
//! This module implements the button-driven FAQ navigator: decoding what a user
//! clicked, resolving it against the FAQ corpus, and rendering the next menu.
//!
//! ## Components
//!
//! - [`state`] - flow variants and the transient [`NavigationState`]
//! - [`payload`] - button value tokens and action id classification
//! - [`blocks`] - the closed subset of Slack Block Kit we emit
//! - [`menu`] - pure rendering of states into menus
//! - [`engine`] - the navigation state machine
//! - [`server`] - transport routing, acknowledgement and reply dispatch
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  BotServer      │ ← ack, route, reply queue
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Navigation     │ ← decode payload → resolve → render
//! │  Engine         │
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  FaqRepository  │ ← immutable corpus snapshots
//! └─────────────────┘
//! ```
//!
//! ## Stateless Navigation
//!
//! Slack does not remember where a user is in a menu, and neither do we. Every button
//! carries its context in its value (`course|category|index`), and every reply is
//! computed from that value alone:
//!
//! 1. User mentions the bot → course picker
//! 2. Course button (`AI 과정`) → category picker (or all questions, flat flow)
//! 3. Category button (`AI 과정|출석`) → question list
//! 4. Question button (`AI 과정|출석|0`) → answer with retry/back buttons

pub mod blocks;
pub mod engine;
pub mod menu;
pub mod payload;
pub mod server;
pub mod state;

pub use blocks::Menu;
pub use engine::{Interaction, NavigationEngine, Transition};
pub use menu::{CourseOption, MenuRenderer};
pub use server::BotServer;
pub use state::{FlowVariant, NavigationState};
