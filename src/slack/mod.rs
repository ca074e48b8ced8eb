//! Slack Socket Mode transport and Web API client.
//!
//! Socket Mode delivers every event as an *envelope* over a WebSocket opened with
//! `apps.connections.open`. Each envelope that carries an `envelope_id` must be
//! acknowledged by echoing that id back within three seconds, so the server acks
//! first and handles later. Replies go out through `chat.postMessage`.
use futures::{SinkExt, StreamExt};
use log::{debug, trace};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::bot::blocks::Menu;
use crate::bot::engine::Interaction;
use crate::errors::{BotError, BotResult};

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Events the bot reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// `app_mention`: show the start menu in `channel`
    Mention {
        channel: String,
        user: String,
        raw: Value,
    },
    /// Plain channel message: audited, never answered
    Message { raw: Value },
    /// `block_actions` button click
    Action(Interaction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeKind {
    Hello,
    /// Slack is about to close the socket; reconnect.
    Disconnect { reason: String },
    Event(InboundEvent),
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub envelope_id: Option<String>,
    pub kind: EnvelopeKind,
}

/// Frame that acknowledges one envelope.
pub fn ack_frame(envelope_id: &str) -> String {
    json!({ "envelope_id": envelope_id }).to_string()
}

fn str_at<'a>(v: &'a Value, pointer: &str) -> Option<&'a str> {
    v.pointer(pointer).and_then(Value::as_str)
}

/// Classify one Socket Mode text frame.
pub fn parse_envelope(text: &str) -> BotResult<Envelope> {
    let v: Value = serde_json::from_str(text)?;
    let envelope_id = str_at(&v, "/envelope_id").map(str::to_string);
    let kind = match str_at(&v, "/type").unwrap_or_default() {
        "hello" => EnvelopeKind::Hello,
        "disconnect" => EnvelopeKind::Disconnect {
            reason: str_at(&v, "/reason").unwrap_or("unknown").to_string(),
        },
        "events_api" => parse_event(&v["payload"]["event"]),
        "interactive" => parse_interactive(&v["payload"]),
        _ => EnvelopeKind::Ignored,
    };
    Ok(Envelope { envelope_id, kind })
}

fn parse_event(event: &Value) -> EnvelopeKind {
    match str_at(event, "/type").unwrap_or_default() {
        "app_mention" => match str_at(event, "/channel") {
            Some(channel) => EnvelopeKind::Event(InboundEvent::Mention {
                channel: channel.to_string(),
                user: str_at(event, "/user").unwrap_or_default().to_string(),
                raw: event.clone(),
            }),
            None => EnvelopeKind::Ignored,
        },
        "message" => EnvelopeKind::Event(InboundEvent::Message { raw: event.clone() }),
        _ => EnvelopeKind::Ignored,
    }
}

fn parse_interactive(payload: &Value) -> EnvelopeKind {
    if str_at(payload, "/type") != Some("block_actions") {
        return EnvelopeKind::Ignored;
    }
    let Some(action) = payload.pointer("/actions/0") else {
        return EnvelopeKind::Ignored;
    };
    let channel = str_at(payload, "/channel/id").or_else(|| str_at(payload, "/container/channel_id"));
    match (str_at(action, "/action_id"), channel) {
        (Some(action_id), Some(channel)) => EnvelopeKind::Event(InboundEvent::Action(Interaction {
            action_id: action_id.to_string(),
            value: str_at(action, "/value").unwrap_or_default().to_string(),
            user_id: str_at(payload, "/user/id").unwrap_or_default().to_string(),
            channel_id: channel.to_string(),
            raw: payload.clone(),
        })),
        _ => EnvelopeKind::Ignored,
    }
}

/// Identity of the bot user behind a bot token
#[derive(Debug, Clone, Deserialize)]
pub struct AuthInfo {
    pub user_id: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub team: String,
}

/// Thin Slack Web API client
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
}

impl SlackClient {
    pub fn new(api_base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn call(&self, method: &str, token: &str, body: Option<&Value>) -> BotResult<Value> {
        let url = format!("{}/{}", self.api_base, method);
        let mut req = self.http.post(&url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| BotError::Transport(format!("{method}: {e}")))?;
        let status = resp.status();
        let v: Value = resp
            .json()
            .await
            .map_err(|e| BotError::Transport(format!("{method}: HTTP {status}: {e}")))?;
        if v["ok"].as_bool() != Some(true) {
            let err = v["error"].as_str().unwrap_or("unknown_error");
            return Err(BotError::Transport(format!("{method}: {err}")));
        }
        trace!("{} ok", method);
        Ok(v)
    }

    /// Ask for a Socket Mode WebSocket URL (needs the `xapp-` token).
    pub async fn open_connection(&self, app_token: &str) -> BotResult<String> {
        let v = self.call("apps.connections.open", app_token, None).await?;
        v["url"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BotError::Transport("apps.connections.open: no url".into()))
    }

    pub async fn auth_test(&self, bot_token: &str) -> BotResult<AuthInfo> {
        let v = self.call("auth.test", bot_token, None).await?;
        Ok(serde_json::from_value(v)?)
    }

    /// Post a menu to a channel.
    pub async fn post_message(&self, bot_token: &str, channel: &str, menu: &Menu) -> BotResult<()> {
        let body = json!({
            "channel": channel,
            "text": menu.text,
            "blocks": menu.blocks,
        });
        self.call("chat.postMessage", bot_token, Some(&body)).await?;
        Ok(())
    }
}

/// Open the Socket Mode WebSocket.
pub async fn connect(url: &str) -> BotResult<WsStream> {
    let (ws, _) = connect_async(url)
        .await
        .map_err(|e| BotError::Transport(format!("WebSocket connect: {e}")))?;
    debug!("Socket Mode connected");
    Ok(ws)
}

/// Send the acknowledgement for one envelope.
pub async fn send_ack<S>(sink: &mut S, envelope_id: &str) -> BotResult<()>
where
    S: futures::Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    sink.send(Message::Text(ack_frame(envelope_id).into()))
        .await
        .map_err(|e| BotError::Transport(format!("ack {envelope_id}: {e}")))
}

/// Next text frame, or `None` once the socket is closed or broken.
pub async fn next_text<S>(stream: &mut S) -> Option<String>
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match stream.next().await? {
            Ok(Message::Text(text)) => return Some(text.as_str().to_string()),
            Ok(Message::Close(frame)) => {
                debug!("Socket closed by peer: {:?}", frame);
                return None;
            }
            Ok(_) => continue,
            Err(e) => {
                debug!("Socket read error: {}", e);
                return None;
            }
        }
    }
}
