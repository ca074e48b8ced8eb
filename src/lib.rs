//! # Faqbot - Button-Driven FAQ Navigator for Slack
//!
//! Faqbot answers bootcamp students' frequently asked questions inside Slack. A
//! mention opens a course picker; from there the user clicks through categories and
//! questions until an answer is shown, with buttons to go back up the hierarchy.
//!
//! ## Features
//!
//! - **Stateless Navigation**: Every button carries its own context, so the bot keeps no per-user sessions.
//! - **Two Flows**: 3-level (course → category → question) or 2-level (course → question) per bot identity.
//! - **Partitioned FAQ Sources**: One JSON document per topic; a broken partition only removes its own entries.
//! - **Audit Trail**: Cumulative JSON and CSV files of every event, interaction and error.
//! - **Socket Mode**: No public HTTP endpoint needed; acks are sent before any handling.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use faqbot::audit::AuditLog;
//! use faqbot::bot::BotServer;
//! use faqbot::config::{Config, Credentials};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let creds = Credentials::from_env(config.bot.identity)?;
//!     let audit = Arc::new(AuditLog::open(&config.audit.dir)?);
//!
//!     let mut server = BotServer::new(config, audit)?;
//!     server.run(&creds).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`bot`] - navigation engine, menu rendering, payload codec and the server loop
//! - [`faq`] - FAQ data model and the snapshotting repository
//! - [`slack`] - Socket Mode envelopes and the Web API client
//! - [`audit`] - audit sink trait and the JSON/CSV file implementation
//! - [`config`] - configuration management and credentials
//! - [`validation`] - load-time checks for FAQ entries and sources
//! - [`errors`] - the crate error type
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Bot Server    │ ← Socket Mode loop, ack, reply queue
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Navigation    │ ← payload → state → menu
//! │   Engine        │
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   FAQ           │ ← partitioned JSON sources
//! │   Repository    │
//! └─────────────────┘
//! ```

pub mod audit;
pub mod bot;
pub mod config;
pub mod errors;
pub mod faq;
pub mod logutil;
pub mod metrics;
pub mod slack;
pub mod validation;
