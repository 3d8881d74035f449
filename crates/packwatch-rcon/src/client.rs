//! Console client: authenticate, run one command, disconnect

use std::time::Duration;

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::codec::{PacketType, read_packet, write_packet};
use crate::error::RconError;

/// Request id used for the authentication frame
const AUTH_REQUEST_ID: i32 = 1;

/// Request id used for the command frame
const COMMAND_REQUEST_ID: i32 = 2;

/// Default deadline for the whole exchange
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote console client
///
/// Opens a fresh connection for every call; nothing is pooled or reused.
#[derive(Clone)]
pub struct RconClient {
    host: String,
    port: u16,
    password: String,
    timeout: Duration,
}

impl std::fmt::Debug for RconClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RconClient")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RconClient {
    /// Create a new client
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the deadline for the whole exchange
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Broadcast `text` to every player as a gold chat line
    ///
    /// # Errors
    /// See [`RconClient::execute`]
    pub async fn send_message(&self, text: &str) -> Result<(), RconError> {
        self.execute(&tellraw_command(text)).await
    }

    /// Authenticate and execute a single command
    ///
    /// # Errors
    /// - `RconError::ConfigError` if no password is set
    /// - `RconError::ConnectionFailed` if the socket cannot be opened
    /// - `RconError::AuthenticationFailed` if the password is rejected
    /// - `RconError::Protocol` if the authentication response is malformed
    /// - `RconError::Timeout` if the exchange exceeds the configured deadline
    #[instrument(skip(self, command), fields(host = %self.host, port = self.port))]
    pub async fn execute(&self, command: &str) -> Result<(), RconError> {
        if self.password.is_empty() {
            return Err(RconError::ConfigError("console password is empty".to_string()));
        }

        match timeout(self.timeout, self.exchange(command)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.timeout, "console exchange timed out");
                Err(RconError::Timeout {
                    timeout: self.timeout,
                })
            }
        }
    }

    async fn exchange(&self, command: &str) -> Result<(), RconError> {
        debug!("connecting to console");

        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| RconError::ConnectionFailed(e.to_string()))?;

        write_packet(&mut stream, AUTH_REQUEST_ID, PacketType::Auth, &self.password).await?;
        let auth = read_packet(&mut stream).await?;
        if auth.is_auth_failure() {
            return Err(RconError::AuthenticationFailed);
        }

        write_packet(&mut stream, COMMAND_REQUEST_ID, PacketType::ExecCommand, command).await?;

        // Servers may split long responses across frames; only the first is read
        // and its content is not used.
        match read_packet(&mut stream).await {
            Ok(response) => debug!(
                request_id = response.request_id,
                body = %response.body,
                "command response"
            ),
            Err(e) => warn!(error = %e, "ignoring unreadable command response"),
        }

        if let Err(e) = stream.shutdown().await {
            debug!(error = %e, "console connection shutdown failed");
        }
        info!("console command delivered");
        Ok(())
    }
}

#[derive(Serialize)]
struct TellrawText<'a> {
    text: &'a str,
    color: &'a str,
}

/// Build a `/tellraw @a` command showing `text` in gold
///
/// The JSON component is rendered ASCII-only so the command survives servers
/// that mangle non-ASCII console input.
#[must_use]
pub fn tellraw_command(text: &str) -> String {
    let component = TellrawText {
        text,
        color: "gold",
    };
    // Serializing two string fields cannot fail
    let json = serde_json::to_string(&component).unwrap_or_default();
    format!("/tellraw @a {}", escape_non_ascii(&json))
}

fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}
