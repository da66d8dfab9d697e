//! HTTP transport for the clearance service.
//!
//! A deliberately small HTTP/1.1 server over `std::net::TcpListener`: parse
//! the request line and headers, read the `Content-Length` body, dispatch,
//! write a JSON response with CORS headers. The browser frontend is served
//! from another origin, so every response carries the CORS header set and
//! `OPTIONS` preflights are answered unconditionally.
//!
//! Request validation lives here: the geometry engine assumes a valid
//! calibration and mode and never re-checks them.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::json;

use crate::detect::{DetectedObject, DetectionProvider};
use crate::report::{BugReport, Mailer};
use crate::rules::{rules_for, InstallationMode, DEFAULT_BRAND};
use crate::zones::{compute_zones, ReferencePoint};

// Photos arrive base64-encoded in the request body.
const MAX_REQUEST_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub addr: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8710".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ApiHandle {
    pub addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ApiHandle {
    pub fn stop(mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            join.join()
                .map_err(|_| anyhow!("api server thread panicked"))?;
        }
        Ok(())
    }
}

pub struct ApiServer {
    cfg: ApiConfig,
    provider: Box<dyn DetectionProvider>,
    mailer: Mailer,
}

impl ApiServer {
    pub fn new(cfg: ApiConfig, provider: Box<dyn DetectionProvider>, mailer: Mailer) -> Self {
        Self {
            cfg,
            provider,
            mailer,
        }
    }

    pub fn spawn(self) -> Result<ApiHandle> {
        let configured_addr: SocketAddr = self.cfg.addr.parse()?;
        let listener = TcpListener::bind(configured_addr)?;
        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_thread = shutdown.clone();
        let provider = self.provider;
        let mailer = self.mailer;
        let join = std::thread::spawn(move || {
            if let Err(err) = run_api(listener, provider, mailer, shutdown_thread) {
                log::error!("clearance api stopped: {}", err);
            }
        });

        Ok(ApiHandle {
            addr,
            shutdown,
            join: Some(join),
        })
    }
}

fn run_api(
    listener: TcpListener,
    provider: Box<dyn DetectionProvider>,
    mailer: Mailer,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, _)) => {
                if let Err(err) = handle_connection(stream, provider.as_ref(), &mailer) {
                    log::warn!("clearance api request rejected: {}", err);
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(50));
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn handle_connection(
    mut stream: TcpStream,
    provider: &dyn DetectionProvider,
    mailer: &Mailer,
) -> Result<()> {
    let request = read_request(&mut stream)?;

    // CORS preflight, answered for any path.
    if request.method == "OPTIONS" {
        return write_response(&mut stream, 204, "application/json", b"");
    }

    if request.method != "POST" {
        if request.method == "GET" && request.path == "/health" {
            return write_json_response(&mut stream, 200, r#"{"status":"ok"}"#);
        }
        return write_json_response(&mut stream, 405, r#"{"error":"Method not allowed"}"#);
    }

    if request.path == "/bug-report" {
        return handle_bug_report(&mut stream, &request, mailer);
    }

    // Every other POST is an analyze request.
    handle_analyze(&mut stream, &request, provider)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    image: Option<String>,
    #[serde(rename = "pxPerMM")]
    px_per_mm: Option<f64>,
    mode: Option<String>,
    brand: Option<String>,
    position: Option<ReferencePoint>,
    image_width: Option<f64>,
    image_height: Option<f64>,
    detections: Option<Vec<DetectedObject>>,
}

fn handle_analyze(
    stream: &mut TcpStream,
    request: &HttpRequest,
    provider: &dyn DetectionProvider,
) -> Result<()> {
    let body: AnalyzeRequest = match serde_json::from_slice(&request.body) {
        Ok(body) => body,
        Err(err) => {
            let message = json!({ "error": format!("Invalid request body: {}", err) });
            return write_json_response(stream, 400, &message.to_string());
        }
    };

    let Some(px_per_mm) = body.px_per_mm.filter(|v| v.is_finite() && *v > 0.0) else {
        return write_json_response(stream, 400, r#"{"error":"Invalid calibration (pxPerMM)"}"#);
    };

    let Some(mode) = body.mode.as_deref().and_then(InstallationMode::parse) else {
        return write_json_response(
            stream,
            400,
            r#"{"error":"Invalid mode (must be flue, boiler, or radiator)"}"#,
        );
    };

    let brand = body.brand.unwrap_or_else(|| DEFAULT_BRAND.to_string());
    let rules = rules_for(&brand, mode);

    let detections = match body.detections {
        Some(detections) => detections,
        None if mode == InstallationMode::Flue => {
            let Some(image) = body.image.as_deref() else {
                return write_json_response(stream, 400, r#"{"error":"Missing image"}"#);
            };
            provider.detect(image, body.image_width, body.image_height)
        }
        // Boiler and radiator installs have the user mark obstacles by hand.
        None => Vec::new(),
    };

    let zones = compute_zones(
        &detections,
        rules,
        px_per_mm,
        body.position,
        body.image_width,
        body.image_height,
    );

    let response = json!({
        "success": true,
        "detections": detections,
        "zones": zones,
        "calibration": {
            "pxPerMM": px_per_mm,
            "brand": brand,
            "mode": mode,
        },
    });
    let payload = serde_json::to_vec(&response)?;
    write_response(stream, 200, "application/json", &payload)
}

fn handle_bug_report(stream: &mut TcpStream, request: &HttpRequest, mailer: &Mailer) -> Result<()> {
    let report: BugReport = match serde_json::from_slice(&request.body) {
        Ok(report) => report,
        Err(err) => {
            let message = json!({ "error": format!("Invalid bug report: {}", err) });
            return write_json_response(stream, 400, &message.to_string());
        }
    };

    match mailer.send_bug_report(&report) {
        Ok(()) => write_json_response(
            stream,
            200,
            r#"{"success":true,"message":"Bug report sent successfully"}"#,
        ),
        Err(err) => {
            log::error!("bug report email failed: {}", err);
            write_json_response(stream, 500, r#"{"error":"Failed to send bug report email"}"#)
        }
    }
}

fn read_request(stream: &mut TcpStream) -> Result<HttpRequest> {
    stream.set_read_timeout(Some(Duration::from_secs(10)))?;
    let mut buf = [0u8; 8192];
    let mut data = Vec::new();
    let header_end = loop {
        if let Some(pos) = find_header_end(&data) {
            break pos;
        }
        if data.len() > MAX_REQUEST_BYTES {
            return Err(anyhow!("request headers too large"));
        }
        let n = stream.read(&mut buf)?;
        if n == 0 {
            return Err(anyhow!("connection closed before headers complete"));
        }
        data.extend_from_slice(&buf[..n]);
    };

    let head = String::from_utf8_lossy(&data[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().ok_or_else(|| anyhow!("empty request"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| anyhow!("missing method"))?
        .to_string();
    let raw_path = parts.next().ok_or_else(|| anyhow!("missing path"))?;

    let mut content_length = 0usize;
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case("content-length") {
                content_length = value
                    .trim()
                    .parse()
                    .map_err(|_| anyhow!("invalid content-length"))?;
            }
        }
    }
    if content_length > MAX_REQUEST_BYTES {
        return Err(anyhow!("request body too large"));
    }

    let mut body = data[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            return Err(anyhow!("connection closed before body complete"));
        }
        body.extend_from_slice(&buf[..n]);
    }
    body.truncate(content_length);

    let path = raw_path
        .split('?')
        .next()
        .unwrap_or(raw_path)
        .to_string();
    Ok(HttpRequest { method, path, body })
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|window| window == b"\r\n\r\n")
}

fn write_json_response(stream: &mut TcpStream, status: u16, body: &str) -> Result<()> {
    write_response(stream, status, "application/json", body.as_bytes())
}

fn write_response(
    stream: &mut TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
) -> Result<()> {
    let status_line = match status {
        200 => "HTTP/1.1 200 OK",
        204 => "HTTP/1.1 204 No Content",
        400 => "HTTP/1.1 400 Bad Request",
        405 => "HTTP/1.1 405 Method Not Allowed",
        _ => "HTTP/1.1 500 Internal Server Error",
    };
    let header = format!(
        "{status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {len}\r\nAccess-Control-Allow-Origin: *\r\nAccess-Control-Allow-Methods: POST, OPTIONS\r\nAccess-Control-Allow-Headers: Content-Type\r\nCache-Control: no-store\r\n\r\n",
        len = body.len()
    );
    stream.write_all(header.as_bytes())?;
    stream.write_all(body)?;
    Ok(())
}

#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}
