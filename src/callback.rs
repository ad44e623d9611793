//! Authorization-code capture
//!
//! A temporary local HTTP listener that receives the provider redirect and
//! extracts the `code` query parameter, acting as a `CredentialSource` for
//! the token-exchange strategy. One request is served and the listener shuts
//! down. A denied consent screen counts as user cancellation, not an error.

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use crate::error::Error;
use crate::strategy::{Credential, CredentialSource};
use crate::Result;

/// Default callback port
pub const DEFAULT_CALLBACK_PORT: u16 = 8085;

const SUCCESS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Sign-in complete</title></head>
<body style="font-family: system-ui, sans-serif; text-align: center; padding-top: 15vh;">
    <h1>Sign-in complete</h1>
    <p>You can close this window and return to the application.</p>
</body>
</html>"#;

const ERROR_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Sign-in failed</title></head>
<body style="font-family: system-ui, sans-serif; text-align: center; padding-top: 15vh;">
    <h1>Sign-in failed</h1>
    <p>Something went wrong during authorization. Please try again.</p>
</body>
</html>"#;

/// Captures an authorization code from the provider redirect
pub struct CallbackCodeSource {
    port: u16,
}

impl CallbackCodeSource {
    pub fn new() -> Self {
        Self {
            port: DEFAULT_CALLBACK_PORT,
        }
    }

    pub fn on_port(port: u16) -> Self {
        Self { port }
    }

    /// The redirect URI to register with the provider for this listener
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/callback", self.port)
    }
}

impl Default for CallbackCodeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSource for CallbackCodeSource {
    async fn acquire(&self) -> Result<Option<Credential>> {
        let addr = format!("127.0.0.1:{}", self.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            Error::OAuth(format!("Failed to start callback listener on {}: {}", addr, e))
        })?;

        tracing::info!("Callback listener waiting on http://{}", addr);

        let (mut socket, _) = listener
            .accept()
            .await
            .map_err(|e| Error::OAuth(format!("Failed to accept connection: {}", e)))?;

        let mut buffer = vec![0u8; 4096];
        let n = socket
            .read(&mut buffer)
            .await
            .map_err(|e| Error::OAuth(format!("Failed to read request: {}", e)))?;
        let request = String::from_utf8_lossy(&buffer[..n]);

        let result = parse_callback_request(&request);

        let (status, body) = match &result {
            Ok(Some(_)) => ("200 OK", SUCCESS_HTML),
            Ok(None) | Err(_) => ("400 Bad Request", ERROR_HTML),
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;

        Ok(result?.map(Credential::authorization_code))
    }
}

/// Extract the authorization code from the redirect request
///
/// `Ok(None)` means the user denied consent.
fn parse_callback_request(request: &str) -> Result<Option<String>> {
    let first_line = request
        .lines()
        .next()
        .ok_or_else(|| Error::OAuth("Empty request".to_string()))?;

    // GET /callback?code=xxx HTTP/1.1
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(Error::OAuth("Invalid request format".to_string()));
    }

    let full_url = format!("http://localhost{}", parts[1]);
    let url = Url::parse(&full_url)
        .map_err(|e| Error::OAuth(format!("Failed to parse callback URL: {}", e)))?;

    let mut code = None;
    let mut error = None;
    let mut error_description = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.to_string()),
            "error" => error = Some(value.to_string()),
            "error_description" => error_description = Some(value.to_string()),
            _ => {}
        }
    }

    if let Some(err) = error {
        if err == "access_denied" {
            tracing::info!("User denied authorization");
            return Ok(None);
        }
        let description = error_description.unwrap_or_else(|| "Unknown error".to_string());
        return Err(Error::OAuth(format!(
            "Authorization failed: {} - {}",
            err, description
        )));
    }

    let code = code.ok_or_else(|| Error::OAuth("Missing authorization code".to_string()))?;
    Ok(Some(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpStream;

    #[test]
    fn test_parse_callback_success() {
        let request = "GET /callback?code=abc123&state=xyz HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let code = parse_callback_request(request).unwrap().unwrap();
        assert_eq!(code, "abc123");
    }

    #[test]
    fn test_parse_callback_denied_is_cancellation() {
        let request = "GET /callback?error=access_denied HTTP/1.1\r\n\r\n";
        assert!(parse_callback_request(request).unwrap().is_none());
    }

    #[test]
    fn test_parse_callback_other_error() {
        let request =
            "GET /callback?error=server_error&error_description=oops HTTP/1.1\r\n\r\n";
        let err = parse_callback_request(request).unwrap_err();
        assert!(err.to_string().contains("server_error"));
        assert!(err.to_string().contains("oops"));
    }

    #[test]
    fn test_parse_callback_missing_code() {
        let request = "GET /callback HTTP/1.1\r\n\r\n";
        assert!(parse_callback_request(request).is_err());
    }

    async fn free_port() -> u16 {
        let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);
        port
    }

    #[tokio::test]
    async fn test_capture_end_to_end() {
        let port = free_port().await;
        let source = CallbackCodeSource::on_port(port);
        let redirect_uri = source.redirect_uri();

        let capture = tokio::spawn(async move { source.acquire().await });

        // Give the listener a moment to bind, then simulate the redirect
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let mut stream = TcpStream::connect(format!("127.0.0.1:{}", port)).await.unwrap();
        stream
            .write_all(b"GET /callback?code=deep-link-code HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(redirect_uri.ends_with("/callback"));

        let credential = capture.await.unwrap().unwrap().unwrap();
        assert_eq!(credential.value, "deep-link-code");
        assert_eq!(credential.kind.wire_name(), "code");
    }
}
