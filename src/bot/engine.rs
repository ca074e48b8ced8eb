//! Navigation state machine.
//!
//! 3-level flow:
//!
//! ```text
//! Start --select(course)--> CourseSelected
//! CourseSelected --select(category)--> CategorySelected
//! CategorySelected --select(index)--> AnswerShown        (index must be in range)
//! AnswerShown --retry--> CategorySelected
//! AnswerShown --back--> CourseSelected
//! CategorySelected --back--> CourseSelected
//! ```
//!
//! The 2-level flow skips `CategorySelected` (indices are positional within the whole
//! course) and adds `back_to_start` from anywhere. There is no terminal state.
//!
//! The engine keeps no per-user state. Each interaction is decoded from its payload,
//! resolved against one corpus snapshot, rendered, and forgotten. Recoverable failures
//! (malformed payloads, stale selections) are audited and produce no reply.
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

use super::blocks::Menu;
use super::menu::MenuRenderer;
use super::payload::{decode_request, parse_action_id, ActionTag};
use super::state::{FlowVariant, NavigationState};
use crate::audit::AuditSink;
use crate::errors::{BotError, BotResult};
use crate::faq::{FaqCorpus, FaqRepository};
use crate::logutil::escape_log;
use crate::metrics;

/// A button click as delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub action_id: String,
    pub value: String,
    pub user_id: String,
    /// Where the reply goes
    pub channel_id: String,
    /// Full platform payload, kept for the audit trail only
    pub raw: Value,
}

/// Result of one successfully handled interaction
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: NavigationState,
    pub menu: Menu,
    /// Audit name of the interaction (`course_selection`, ...)
    pub action: &'static str,
}

pub struct NavigationEngine {
    repo: Arc<FaqRepository>,
    renderer: MenuRenderer,
    audit: Arc<dyn AuditSink>,
}

impl NavigationEngine {
    pub fn new(repo: Arc<FaqRepository>, renderer: MenuRenderer, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            repo,
            renderer,
            audit,
        }
    }

    pub fn flow(&self) -> FlowVariant {
        self.renderer.flow()
    }

    pub fn renderer(&self) -> &MenuRenderer {
        &self.renderer
    }

    pub fn repository(&self) -> &Arc<FaqRepository> {
        &self.repo
    }

    /// Entry menu shown when the bot is mentioned.
    pub fn start(&self) -> Menu {
        self.renderer.render_start()
    }

    /// Decode, resolve and render without touching the audit trail.
    pub fn resolve(&self, interaction: &Interaction) -> BotResult<Transition> {
        let (tag, state) = self.decode(interaction)?;
        self.render(tag, state)
    }

    /// Handle one interaction end to end. `None` means "send nothing".
    pub fn handle(&self, interaction: &Interaction) -> Option<Transition> {
        metrics::inc_interactions();
        let outcome = self.decode(interaction).and_then(|(tag, state)| {
            self.audit.user_interaction(
                tag.audit_name(),
                &interaction.user_id,
                &interaction.value,
                Some(&interaction.raw),
            );
            metrics::record_action(tag.audit_name());
            self.render(tag, state)
        });
        match outcome {
            Ok(t) => {
                debug!(
                    "{} by {} -> {}",
                    t.action,
                    interaction.user_id,
                    escape_log(&t.state.breadcrumb())
                );
                Some(t)
            }
            Err(e) => {
                self.report(&interaction.action_id, &e);
                None
            }
        }
    }

    fn decode(&self, interaction: &Interaction) -> BotResult<(ActionTag, NavigationState)> {
        let tag = parse_action_id(&interaction.action_id)?;
        let state = decode_request(&tag, &interaction.value, self.flow())?;
        Ok((tag, state))
    }

    fn render(&self, tag: ActionTag, state: NavigationState) -> BotResult<Transition> {
        let menu = match &state {
            NavigationState::Start => self.renderer.render_start(),
            _ => {
                let corpus = self.repo.snapshot();
                self.render_state(&state, &corpus)?
            }
        };
        Ok(Transition {
            state,
            menu,
            action: tag.audit_name(),
        })
    }

    /// Render a decoded state against a corpus snapshot, checking that whatever the
    /// payload points at still exists.
    pub fn render_state(&self, state: &NavigationState, corpus: &FaqCorpus) -> BotResult<Menu> {
        match state {
            NavigationState::Start => Ok(self.renderer.render_start()),
            NavigationState::CourseSelected { course } => {
                let offered = self.renderer.courses().iter().any(|c| &c.name == course);
                if !offered && corpus.questions_for(course).is_empty() {
                    return Err(BotError::StaleSelection(format!("unknown course '{course}'")));
                }
                Ok(self.renderer.render_course(corpus, course))
            }
            NavigationState::CategorySelected { course, category } => {
                if self.flow() == FlowVariant::Flat {
                    return Err(BotError::malformed(category, "categories are not part of the flat flow"));
                }
                if !corpus.has_category(course, category) {
                    return Err(BotError::StaleSelection(format!(
                        "category '{category}' no longer exists in '{course}'"
                    )));
                }
                Ok(self.renderer.render_category(corpus, course, category))
            }
            NavigationState::AnswerShown {
                course,
                category,
                index,
            } => {
                let view = match category {
                    Some(category) => corpus.questions_for_category(course, category),
                    None => corpus.questions_for(course),
                };
                match view.get(*index) {
                    Some(entry) => Ok(self.renderer.render_answer(entry)),
                    None => Err(BotError::StaleSelection(format!(
                        "index {index} out of range for {} ({} entries)",
                        state.breadcrumb(),
                        view.len()
                    ))),
                }
            }
        }
    }

    fn report(&self, action_id: &str, e: &BotError) {
        match e {
            BotError::StaleSelection(_) => metrics::inc_stale(),
            BotError::MalformedPayload { .. } => metrics::inc_malformed(),
            _ => {}
        }
        warn!("{} on {}: {}", e.kind(), escape_log(action_id), e);
        self.audit
            .error(&format!("{} ({})", e.kind(), action_id), Some(e));
    }
}
