//! Loopback callback server for browser-based social sign-in.

use crate::{AuthError, AuthResult};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error, info};

/// Default callback port.
pub const DEFAULT_OAUTH_PORT: u16 = 9876;

/// Default time to wait for the browser redirect, in seconds.
pub const DEFAULT_OAUTH_TIMEOUT_SECS: u64 = 180;

type CallbackSender = Arc<Mutex<Option<oneshot::Sender<AuthResult<String>>>>>;

/// Callback server that receives the provider's redirect.
pub struct OAuthCallbackServer {
    port: u16,
    timeout_secs: u64,
}

impl OAuthCallbackServer {
    pub fn new(port: u16, timeout_secs: u64) -> Self {
        Self { port, timeout_secs }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_OAUTH_PORT, DEFAULT_OAUTH_TIMEOUT_SECS)
    }

    /// Redirect target registered with the identity service.
    pub fn callback_url(&self) -> String {
        callback_url_for(self.port)
    }

    /// Bind the listener. The browser should be opened only after this
    /// returns so the redirect cannot arrive before anyone is listening.
    pub async fn listen(&self) -> AuthResult<PendingCallback> {
        let addr = format!("127.0.0.1:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AuthError::OAuth(format!("Failed to bind to {}: {}", addr, e)))?;
        let port = listener.local_addr()?.port();

        info!(port, "social sign-in callback server listening");

        Ok(PendingCallback {
            listener,
            port,
            timeout_secs: self.timeout_secs,
        })
    }
}

fn callback_url_for(port: u16) -> String {
    format!("http://localhost:{}/callback", port)
}

/// A bound callback listener waiting for the authorization code.
pub struct PendingCallback {
    listener: TcpListener,
    port: u16,
    timeout_secs: u64,
}

impl PendingCallback {
    /// Port actually bound (differs from the configured one when that was 0).
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn callback_url(&self) -> String {
        callback_url_for(self.port)
    }

    /// Serve requests until one carries a code or an error, or the timeout
    /// elapses.
    pub async fn wait_for_code(self) -> AuthResult<String> {
        let (tx, rx) = oneshot::channel::<AuthResult<String>>();
        let tx: CallbackSender = Arc::new(Mutex::new(Some(tx)));
        let listener = self.listener;

        let server_handle = tokio::spawn({
            let tx = tx.clone();
            async move {
                loop {
                    match listener.accept().await {
                        Ok((mut socket, _)) => {
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(&mut socket, tx).await {
                                    error!("Error handling callback connection: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                            break;
                        }
                    }
                }
            }
        });

        let timeout = tokio::time::Duration::from_secs(self.timeout_secs);
        let result = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(AuthError::OAuth("callback channel closed".to_string())),
            Err(_) => Err(AuthError::Timeout),
        };

        server_handle.abort();
        result
    }
}

/// Outcome of one callback request.
#[derive(Debug, PartialEq, Eq)]
enum CallbackOutcome {
    Code(String),
    Failed(String),
}

/// Read the query of `/callback?...` for `code` or an error description.
fn parse_callback(path: &str) -> Option<CallbackOutcome> {
    let parsed = url::Url::parse(&format!("http://localhost{}", path)).ok()?;
    if parsed.path() != "/callback" {
        return None;
    }

    let mut code = None;
    let mut error = None;
    let mut description = None;
    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => description = Some(value.into_owned()),
            _ => {}
        }
    }

    Some(match (code, description.or(error)) {
        (_, Some(message)) => CallbackOutcome::Failed(message),
        (Some(code), None) if !code.is_empty() => CallbackOutcome::Code(code),
        _ => CallbackOutcome::Failed("Missing authorization code".to_string()),
    })
}

/// Target of a `GET <target> HTTP/x` request line; `None` when it is
/// missing.
fn request_target(request_line: &str) -> Option<&str> {
    let line = request_line.trim_end();
    let path_end = line.find(" HTTP/").unwrap_or(line.len());
    let target = line.get(4..path_end)?.trim();
    (!target.is_empty()).then_some(target)
}

async fn handle_connection(
    socket: &mut tokio::net::TcpStream,
    tx: CallbackSender,
) -> AuthResult<()> {
    let (reader, mut writer) = socket.split();
    let mut reader = BufReader::new(reader);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    debug!(request = %request_line.trim(), "Received callback request");

    if !request_line.starts_with("GET ") {
        send_response(&mut writer, 405, "Method Not Allowed", "Method Not Allowed").await?;
        return Ok(());
    }

    let Some(path) = request_target(&request_line) else {
        send_response(&mut writer, 400, "Bad Request", "Bad Request").await?;
        return Ok(());
    };

    let outcome = match parse_callback(path) {
        Some(outcome) => outcome,
        None => {
            send_response(&mut writer, 404, "Not Found", "Not Found").await?;
            return Ok(());
        }
    };

    let result = match outcome {
        CallbackOutcome::Code(code) => {
            send_response(&mut writer, 200, "OK", &success_page()).await?;
            Ok(code)
        }
        CallbackOutcome::Failed(message) => {
            send_response(&mut writer, 200, "OK", &error_page(&message)).await?;
            Err(AuthError::OAuth(message))
        }
    };

    if let Some(tx) = tx.lock().await.take() {
        let _ = tx.send(result);
    }

    Ok(())
}

async fn send_response(
    writer: &mut tokio::net::tcp::WriteHalf<'_>,
    status_code: u16,
    status_text: &str,
    body: &str,
) -> AuthResult<()> {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_code,
        status_text,
        body.len(),
        body
    );
    writer.write_all(response.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

fn success_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head><title>CareerPath - Signed In</title></head>
<body style="font-family: system-ui; text-align: center; padding: 50px; background: #f5f5f5;">
<div style="max-width: 400px; margin: 0 auto; background: white; padding: 40px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
<h1 style="color: #22c55e; margin-bottom: 20px;">You're signed in!</h1>
<p style="color: #666;">You can close this window and return to the terminal.</p>
</div>
<script>setTimeout(() => window.close(), 2000);</script>
</body>
</html>"#
        .to_string()
}

fn error_page(error: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>CareerPath - Sign-In Failed</title></head>
<body style="font-family: system-ui; text-align: center; padding: 50px; background: #f5f5f5;">
<div style="max-width: 400px; margin: 0 auto; background: white; padding: 40px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
<h1 style="color: #ef4444; margin-bottom: 20px;">Sign-In Failed</h1>
<p style="color: #666;">Error: {}</p>
<p style="color: #888; font-size: 14px;">You can close this window and try again.</p>
</div>
</body>
</html>"#,
        html_escape(error)
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
