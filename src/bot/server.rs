//! Bot server: Socket Mode loop, envelope routing and reply dispatch.
//!
//! ```text
//! socket reader ──ack──▶ Slack
//!      │
//!      └─spawn_blocking─▶ Router::route ──Reply──▶ mpsc ──▶ writer task ──▶ chat.postMessage
//! ```
//!
//! Acknowledgement always happens before routing, so a slow corpus reload or audit
//! write can never push an envelope past Slack's ack deadline.
use anyhow::{anyhow, Result};
use futures::StreamExt;
use log::{debug, error, info, warn};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::blocks::Menu;
use super::engine::NavigationEngine;
use super::menu::MenuRenderer;
use crate::audit::AuditSink;
use crate::config::{Config, Credentials};
use crate::faq::FaqRepository;
use crate::metrics;
use crate::slack::{self, EnvelopeKind, InboundEvent, SlackClient};

/// One outbound message
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub channel: String,
    pub menu: Menu,
}

/// Routing half of the server; cheap to clone into blocking tasks.
#[derive(Clone)]
pub struct Router {
    engine: Arc<NavigationEngine>,
    audit: Arc<dyn AuditSink>,
}

impl Router {
    pub fn new(engine: Arc<NavigationEngine>, audit: Arc<dyn AuditSink>) -> Self {
        Self { engine, audit }
    }

    /// Decide what, if anything, to send back for one inbound event.
    pub fn route(&self, event: InboundEvent) -> Option<Reply> {
        match event {
            InboundEvent::Mention { channel, user, raw } => {
                self.audit.event("app_mention", &raw);
                debug!("mention from {} in {}", user, channel);
                Some(Reply {
                    channel,
                    menu: self.engine.start(),
                })
            }
            InboundEvent::Message { raw } => {
                self.audit.event("message", &raw);
                None
            }
            InboundEvent::Action(interaction) => {
                let channel = interaction.channel_id.clone();
                self.engine
                    .handle(&interaction)
                    .map(|t| Reply { channel, menu: t.menu })
            }
        }
    }
}

pub struct BotServer {
    config: Config,
    router: Router,
    audit: Arc<dyn AuditSink>,
    client: SlackClient,
    test_replies: Vec<Reply>,
}

impl BotServer {
    /// Build the repository and engine for the configured flow. No network I/O.
    pub fn new(config: Config, audit: Arc<dyn AuditSink>) -> Result<Self> {
        config.validate()?;
        let repo = Arc::new(FaqRepository::new(
            config.faq.sources.clone(),
            config.faq.reload,
            audit.clone(),
        ));
        let renderer = MenuRenderer::new(config.flow(), config.courses.clone());
        let engine = Arc::new(NavigationEngine::new(repo, renderer, audit.clone()));
        Ok(Self::with_engine(config, engine, audit))
    }

    /// Server over a prebuilt engine (tests inject an in-memory corpus this way).
    pub fn with_engine(config: Config, engine: Arc<NavigationEngine>, audit: Arc<dyn AuditSink>) -> Self {
        let client = SlackClient::new(&config.slack.api_base);
        Self {
            router: Router::new(engine, audit.clone()),
            audit,
            client,
            config,
            test_replies: Vec::new(),
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn route_event(&self, event: InboundEvent) -> Option<Reply> {
        self.router.route(event)
    }

    /// Route an event and keep the reply instead of sending it.
    #[doc(hidden)]
    pub async fn route_test_event(&mut self, event: InboundEvent) -> Result<()> {
        let router = self.router.clone();
        let reply = tokio::task::spawn_blocking(move || router.route(event))
            .await
            .map_err(|e| anyhow!("routing task failed: {}", e))?;
        if let Some(reply) = reply {
            self.test_replies.push(reply);
        }
        Ok(())
    }

    #[allow(dead_code)]
    #[doc(hidden)]
    pub fn test_replies(&self) -> &Vec<Reply> {
        &self.test_replies
    }

    /// Run until Ctrl-C or until reconnecting fails too often.
    ///
    /// Failing to establish the very first connection is fatal and returned
    /// immediately so the process exits non-zero.
    pub async fn run(&mut self, creds: &Credentials) -> Result<()> {
        let who = self.client.auth_test(&creds.bot_token).await?;
        info!(
            "'{}' signed in as {} ({}), {} flow",
            self.config.bot.name,
            who.user,
            who.user_id,
            self.config.flow().as_str()
        );
        self.audit.info(
            "Slack 봇 시작",
            Some(&json!({
                "bot_user_id": who.user_id,
                "identity": self.config.bot.identity.as_str(),
                "flow": self.config.flow().as_str(),
            })),
        );

        let (tx, rx) = mpsc::unbounded_channel::<Reply>();
        let writer = tokio::spawn(reply_writer(
            self.client.clone(),
            creds.bot_token.clone(),
            rx,
            self.audit.clone(),
        ));

        let result = self.socket_loop(creds, tx).await;
        writer.abort();
        result
    }

    async fn socket_loop(&self, creds: &Credentials, tx: mpsc::UnboundedSender<Reply>) -> Result<()> {
        let max = self.config.slack.max_reconnects;
        let mut failures = 0u32;
        let mut connected_once = false;

        let stats_secs = self.config.slack.stats_interval_secs;
        let mut stats = tokio::time::interval(Duration::from_secs(stats_secs.max(1)));
        stats.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            let ws = match self.connect(creds).await {
                Ok(ws) => {
                    connected_once = true;
                    failures = 0;
                    ws
                }
                Err(e) if !connected_once => return Err(e.into()),
                Err(e) => {
                    failures += 1;
                    if failures > max {
                        return Err(anyhow!("giving up after {} reconnect attempts: {}", max, e));
                    }
                    let backoff = Duration::from_secs(2u64.saturating_pow(failures.min(5)));
                    warn!("reconnect {}/{} failed: {}; retrying in {:?}", failures, max, e, backoff);
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            };

            let (mut ws_tx, mut ws_rx) = ws.split();
            loop {
                tokio::select! {
                    frame = slack::next_text(&mut ws_rx) => {
                        let Some(text) = frame else {
                            warn!("Socket Mode connection dropped; reconnecting");
                            break;
                        };
                        let envelope = match slack::parse_envelope(&text) {
                            Ok(env) => env,
                            Err(e) => {
                                warn!("unparseable frame: {}", e);
                                continue;
                            }
                        };
                        if let Some(id) = &envelope.envelope_id {
                            if let Err(e) = slack::send_ack(&mut ws_tx, id).await {
                                warn!("{}", e);
                                break;
                            }
                            metrics::inc_acks();
                        }
                        match envelope.kind {
                            EnvelopeKind::Hello => info!("Socket Mode ready"),
                            EnvelopeKind::Disconnect { reason } => {
                                info!("Slack requested disconnect ({}); reconnecting", reason);
                                break;
                            }
                            EnvelopeKind::Event(event) => self.dispatch(event, &tx),
                            EnvelopeKind::Ignored => {}
                        }
                    }
                    _ = stats.tick(), if stats_secs > 0 => {
                        let s = metrics::snapshot();
                        let mut actions: Vec<_> = metrics::action_counters_snapshot().into_iter().collect();
                        actions.sort();
                        info!(
                            "stats: interactions={} replies={} malformed={} stale={} source_failures={} acks={} actions={:?}",
                            s.interactions, s.replies, s.malformed, s.stale, s.source_failures, s.acks, actions
                        );
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Received shutdown signal");
                        return Ok(());
                    }
                }
            }
        }
    }

    async fn connect(&self, creds: &Credentials) -> crate::errors::BotResult<slack::WsStream> {
        let url = self.client.open_connection(&creds.app_token).await?;
        slack::connect(&url).await
    }

    fn dispatch(&self, event: InboundEvent, tx: &mpsc::UnboundedSender<Reply>) {
        let router = self.router.clone();
        let tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            if let Some(reply) = router.route(event) {
                if tx.send(reply).is_err() {
                    warn!("reply dropped: writer stopped");
                }
            }
        });
    }
}

async fn reply_writer(
    client: SlackClient,
    bot_token: String,
    mut rx: mpsc::UnboundedReceiver<Reply>,
    audit: Arc<dyn AuditSink>,
) {
    while let Some(reply) = rx.recv().await {
        match client.post_message(&bot_token, &reply.channel, &reply.menu).await {
            Ok(()) => {
                metrics::inc_replies();
            }
            Err(e) => {
                error!("chat.postMessage to {} failed: {}", reply.channel, e);
                audit.error(&format!("메시지 전송 실패: {}", reply.channel), Some(&e));
            }
        }
    }
}
