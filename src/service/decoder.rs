//! TCP decoder listener: one thread per connection, reading a single
//! newline-free JSON request until EOF and dispatching into
//! [`crate::DecoderService`]. Replies (when there is one) go out over a
//! fresh TCP connection back to the client's own receive port, per
//! `spec.md` §6 — the inbound connection is never written to.

use std::io::{Read, Write};
use std::net::{IpAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::scoring::language::HEAD_SENTINEL;
use crate::DecoderService;

const READ_TIMEOUT: Duration = Duration::from_secs(5);
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(rename = "TASK")]
    task: String,
    #[serde(rename = "PREV_WORD", default)]
    prev_word: String,
    #[serde(rename = "PREV_TEXT", default)]
    prev_text: String,
    #[serde(rename = "UNDO_WORDS", default)]
    undo_words: Vec<String>,
    #[serde(rename = "PORT", default)]
    port: u16,
    #[serde(rename = "XPOINTS", default)]
    xpoints: String,
    #[serde(rename = "YPOINTS", default)]
    ypoints: String,
    // Accepted and ignored — the core never reads trajectory metadata, but
    // the field must still parse as a point-list string without erroring.
    #[serde(rename = "ORIENTATIONS", default)]
    _orientations: String,
    #[serde(rename = "TIMESTAMPS", default)]
    _timestamps: String,
    #[serde(rename = "VELOCITIES", default)]
    _velocities: String,
    #[serde(rename = "CUR_WORD", default)]
    cur_word: String,
}

#[derive(Debug, Serialize)]
struct Reply {
    #[serde(rename = "RESULT_WORDS")]
    result_words: Vec<String>,
    #[serde(rename = "RESULT_SCORES")]
    result_scores: Vec<f64>,
}

pub struct DecoderListener {
    listener: TcpListener,
    service: Arc<DecoderService>,
}

impl DecoderListener {
    pub fn bind(port: u16, service: Arc<DecoderService>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        Ok(Self { listener, service })
    }

    /// Accept connections and spawn a handler thread for each, until
    /// `shutdown` is set.
    pub fn serve(&self, shutdown: Arc<AtomicBool>) {
        if let Err(e) = self.listener.set_nonblocking(true) {
            tracing::error!(%e, "failed to set decoder listener non-blocking");
            return;
        }
        while !shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    let service = Arc::clone(&self.service);
                    thread::spawn(move || handle_client(stream, addr.ip(), service));
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => tracing::warn!(%e, "decoder accept failed"),
            }
        }
    }
}

fn handle_client(mut stream: TcpStream, client: IpAddr, service: Arc<DecoderService>) {
    if let Err(e) = stream.set_read_timeout(Some(READ_TIMEOUT)) {
        tracing::warn!(%e, %client, "failed to set read timeout");
        return;
    }
    let mut body = String::new();
    if let Err(e) = stream.read_to_string(&mut body) {
        tracing::debug!(%e, %client, "connection read error");
        return;
    }
    drop(stream);

    if body.trim().is_empty() {
        return;
    }
    dispatch(&service, client, body.trim());
}

/// Strip the surrounding brackets off a `"[n,n,…]"` point-list string and
/// parse the comma-separated integers inside.
fn parse_point_list(raw: &str) -> Result<Vec<i64>, DecodeError> {
    let trimmed = raw.trim();
    if trimmed.len() < 2 {
        return Err(DecodeError::BadRequest("point list too short".into()));
    }
    let inner = &trimmed[1..trimmed.len() - 1];
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|tok| {
            tok.trim()
                .parse::<i64>()
                .map_err(|e| DecodeError::BadRequest(format!("malformed point list entry: {e}")))
        })
        .collect()
}

fn dispatch(service: &DecoderService, client: IpAddr, body: &str) {
    let request: RawRequest = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(%e, %client, "malformed request");
            return;
        }
    };

    match request.task.as_str() {
        "DECODE" | "CMD_DECODE" => match decode_request(service, client, &request) {
            Ok(Some(reply)) => {
                if let Err(e) = send_reply(client, request.port, &reply) {
                    tracing::debug!(%e, %client, port = request.port, "reply callback failed");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::debug!(%e, %client, task = %request.task, "decode request failed"),
        },
        "CONFIRM" => {
            service.confirm(client, &request.cur_word);
        }
        "UNDO" => {
            service.undo(client);
        }
        other => tracing::debug!(task = %other, %client, "unknown task"),
    }
}

fn decode_request(
    service: &DecoderService,
    client: IpAddr,
    request: &RawRequest,
) -> Result<Option<Reply>, DecodeError> {
    let xs = parse_point_list(&request.xpoints)?;
    let ys = parse_point_list(&request.ypoints)?;

    let result = if request.task == "CMD_DECODE" {
        service.decode_command(client, &xs, &ys, &request.undo_words)
    } else {
        let prev_word = if request.prev_word.is_empty() { HEAD_SENTINEL } else { &request.prev_word };
        let prev_text = if request.prev_text.is_empty() { HEAD_SENTINEL } else { &request.prev_text };
        service.decode(client, &xs, &ys, prev_word, prev_text, &request.undo_words)
    };

    match result {
        Ok((words, scores)) if !words.is_empty() => {
            Ok(Some(Reply { result_words: words, result_scores: scores }))
        }
        Ok(_) => Ok(None),
        Err(DecodeError::EmptyCandidateSet) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Open a new outbound connection to the client's receive port and deliver
/// the reply, per `spec.md` §6. Connect/write failures surface as
/// [`DecodeError::TransientNetworkError`]: logged and dropped, the client
/// will retry.
fn send_reply(client: IpAddr, port: u16, reply: &Reply) -> Result<(), DecodeError> {
    let payload = serde_json::to_vec(reply).expect("Reply serialization cannot fail");
    let mut callback = TcpStream::connect((client, port))?;
    callback.write_all(&payload)?;
    Ok(())
}
