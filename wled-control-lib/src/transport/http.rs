use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::{Client, Response};
use serde_json::{json, Value};

use crate::control_interface::command::{DeviceInfoResponse, StateCommand};
use crate::error::{Error, Result};
use crate::transport::{SegmentEncoding, Transport};
use crate::util::traits::check_reply;

pub const DEFAULT_HTTP_PORT: u16 = 80;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Where and how to reach a device over HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn new(host: &str) -> Self {
        HttpConfig {
            host: host.to_string(),
            port: DEFAULT_HTTP_PORT,
            tls: false,
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Root of the JSON API, e.g. `http://wled.local:80/json`.
    pub fn base_url(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}:{}/json", scheme, self.host, self.port)
    }
}

/// Talks to `/json/state` and `/json/info` over HTTP.
#[derive(Debug)]
pub struct HttpTransport {
    base_url: String,
    client: Option<Client>,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        // Devices live on the local network, never behind a proxy.
        let client = Client::builder()
            .timeout(config.timeout)
            .no_proxy()
            .build()
            .map_err(|e| Error::Connection(format!("Failed to create HTTP client: {}", e)))?;
        let base_url = config.base_url();
        info!("Using WLED JSON API at {}", base_url);
        Ok(HttpTransport {
            base_url,
            client: Some(client),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| Error::Connection("HTTP transport is closed".to_string()))
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn get(&self, endpoint: &str) -> Result<Value> {
        let url = self.url(endpoint);
        let response = self
            .client()?
            .get(&url)
            .send()
            .map_err(|e| connection_error(&url, e))?;
        read_json(&url, response)
    }
}

fn connection_error(url: &str, err: reqwest::Error) -> Error {
    Error::Connection(format!(
        "Error connecting to WLED device at {}: {}",
        url, err
    ))
}

fn read_json(url: &str, response: Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Response(format!(
            "Request to {} failed with status: {}",
            url, status
        )));
    }
    let body = response
        .text()
        .map_err(|e| Error::Response(format!("Failed to read reply from {}: {}", url, e)))?;
    debug!("Reply from {}: {}", url, body);
    if body.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(&body).map_err(|e| {
        Error::Response(format!("Error decoding response from WLED device: {}", e))
    })
}

impl Transport for HttpTransport {
    fn send(&mut self, command: &StateCommand) -> Result<Value> {
        let url = self.url("state");
        debug!("POST {} {}", url, serde_json::to_string(command)?);
        let response = self
            .client()?
            .post(&url)
            .json(command)
            .send()
            .map_err(|e| connection_error(&url, e))?;
        check_reply(read_json(&url, response)?)
    }

    fn get_info(&mut self) -> Result<DeviceInfoResponse> {
        DeviceInfoResponse::from_reply(self.get("info")?)
    }

    fn get_state(&mut self) -> Result<Value> {
        self.get("state")
    }

    fn segment_encoding(&self) -> SegmentEncoding {
        SegmentEncoding::Ranges
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            info!("Closed HTTP transport for {}", self.base_url);
        }
    }

    fn is_closed(&self) -> bool {
        self.client.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_interface::command::SegmentCommand;
    use crate::error::ErrorKind;
    use crate::led::color::Rgb;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serves exactly one request with the given status line and body, and
    /// hands back the raw request it received.
    fn serve_once(status: &'static str, body: &'static str) -> (u16, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                request.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut payload = vec![0u8; content_length];
            reader.read_exact(&mut payload).unwrap();
            request.push_str(&String::from_utf8(payload).unwrap());

            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let mut stream = reader.into_inner();
            stream.write_all(reply.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });
        (port, handle)
    }

    fn transport(port: u16) -> HttpTransport {
        let config = HttpConfig::new("127.0.0.1")
            .with_port(port)
            .with_timeout(Duration::from_secs(2));
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn test_base_url() {
        assert_eq!(
            HttpConfig::new("wled.local").base_url(),
            "http://wled.local:80/json"
        );
        assert_eq!(
            HttpConfig::new("10.0.0.2").with_port(8443).with_tls(true).base_url(),
            "https://10.0.0.2:8443/json"
        );
    }

    #[test]
    fn test_send_posts_to_state() {
        let (port, server) = serve_once("200 OK", r#"{"success":true}"#);
        let mut transport = transport(port);
        let command = StateCommand::segments(vec![SegmentCommand::range(
            0,
            0,
            10,
            Rgb::new(0, 0, 255),
        )]);
        let reply = transport.send(&command).unwrap();
        assert_eq!(reply, json!({"success": true}));

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /json/state "));
        assert!(request.ends_with(r#"{"seg":[{"id":0,"start":0,"stop":10,"col":[[0,0,255]]}]}"#));
    }

    #[test]
    fn test_get_info_reads_led_count() {
        let (port, server) = serve_once("200 OK", r#"{"ver":"0.14.4","leds":{"count":42}}"#);
        let mut transport = transport(port);
        let info = transport.get_info().unwrap();
        assert_eq!(info.led_count(), 42);
        assert!(server.join().unwrap().starts_with("GET /json/info "));
    }

    #[test]
    fn test_error_status_is_response_error() {
        let (port, server) = serve_once("500 Internal Server Error", "{}");
        let mut transport = transport(port);
        let err = transport.send(&StateCommand::power(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Response);
        server.join().unwrap();
    }

    #[test]
    fn test_garbage_body_is_response_error() {
        let (port, server) = serve_once("200 OK", "<html>nope</html>");
        let mut transport = transport(port);
        let err = transport.get_state().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Response);
        server.join().unwrap();
    }

    #[test]
    fn test_device_error_is_command_error() {
        let (port, server) = serve_once("200 OK", r#"{"error":9}"#);
        let mut transport = transport(port);
        let err = transport.send(&StateCommand::power(false)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Command);
        server.join().unwrap();
    }

    #[test]
    fn test_unreachable_is_connection_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut transport = transport(port);
        let err = transport.get_info().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut transport = transport(DEFAULT_HTTP_PORT);
        transport.close();
        transport.close();
        assert!(transport.is_closed());
        let err = transport.send(&StateCommand::power(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }
}
