//! HTTP host for the advisory pipeline.
//!
//! A deliberately small std-TCP server: decode the request, hand the image
//! to the detector backend, run the advisory pipeline, write JSON back.
//! Transport concerns end here; the pipeline itself is pure.

use anyhow::{anyhow, Result};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::detect::BackendRegistry;
use crate::pipeline::Advisor;
use crate::{EnrichedDetection, PriorityTable};

/// Detection requests carry a base64 image; keep a hard cap on body size.
const MAX_REQUEST_BYTES: usize = 8 * 1024 * 1024;

/// The query flow echoes at most this many detections.
const MAX_QUERY_DETECTIONS: usize = 10;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub addr: String,
    /// Confidence floor applied when a request does not set its own.
    pub min_confidence: f32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8000".to_string(),
            min_confidence: 0.4,
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
    registry: BackendRegistry,
}

impl ApiServer {
    pub fn new(cfg: ApiConfig, registry: BackendRegistry) -> Self {
        Self { cfg, registry }
    }

    pub fn spawn(self) -> Result<ApiHandle> {
        let configured_addr: SocketAddr = self.cfg.addr.parse()?;
        let listener = TcpListener::bind(configured_addr)?;
        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_thread = shutdown.clone();
        let cfg = self.cfg.clone();
        let registry = self.registry;
        let join = std::thread::spawn(move || {
            if let Err(err) = run_api(listener, cfg, registry, shutdown_thread) {
                log::error!("advisory api stopped: {}", err);
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
    cfg: ApiConfig,
    registry: BackendRegistry,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let advisor = Advisor::new(PriorityTable::navigation_defaults());
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, _)) => {
                if let Err(err) = handle_connection(stream, &advisor, &registry, &cfg) {
                    log::warn!("advisory api request rejected: {}", err);
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
    advisor: &Advisor,
    registry: &BackendRegistry,
    cfg: &ApiConfig,
) -> Result<()> {
    let request = read_request(&mut stream)?;

    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/") => {
            let banner = serde_json::json!({
                "status": "online",
                "service": "wayfinder",
                "version": env!("CARGO_PKG_VERSION"),
            });
            write_json_response(&mut stream, 200, &banner.to_string())
        }
        ("GET", "/health") => {
            let health = serde_json::json!({
                "status": "ok",
                "backend": registry.default_name(),
            });
            write_json_response(&mut stream, 200, &health.to_string())
        }
        ("POST", "/detect") => handle_detect(&mut stream, &request, advisor, registry, cfg, false),
        ("POST", "/detect-with-query") => {
            handle_detect(&mut stream, &request, advisor, registry, cfg, true)
        }
        (_, "/" | "/health" | "/detect" | "/detect-with-query") => {
            write_json_response(&mut stream, 405, r#"{"error":"method_not_allowed"}"#)
        }
        _ => write_json_response(&mut stream, 404, r#"{"error":"not_found"}"#),
    }
}

fn handle_detect(
    stream: &mut TcpStream,
    request: &HttpRequest,
    advisor: &Advisor,
    registry: &BackendRegistry,
    cfg: &ApiConfig,
    with_query: bool,
) -> Result<()> {
    let detect_request: DetectRequest = match serde_json::from_slice(&request.body) {
        Ok(parsed) => parsed,
        Err(err) => {
            write_json_response(stream, 400, r#"{"error":"invalid_request"}"#)?;
            return Err(anyhow!("malformed detect request: {}", err));
        }
    };

    let image = match decode_image_payload(&detect_request.image) {
        Ok(bytes) => bytes,
        Err(err) => {
            write_json_response(stream, 400, r#"{"error":"invalid_image"}"#)?;
            return Err(anyhow!("undecodable image payload: {}", err));
        }
    };

    if registry.default_backend().is_none() {
        write_json_response(stream, 503, r#"{"error":"backend_unavailable"}"#)?;
        return Ok(());
    }

    let min_confidence = detect_request.min_confidence.unwrap_or(cfg.min_confidence);
    let detected = match registry.detect(&image, min_confidence) {
        Ok(detected) => detected,
        Err(err) => {
            // Collaborator failures surface unmodified; no retries here.
            let body = serde_json::json!({
                "error": "detection_failed",
                "detail": err.to_string(),
            });
            write_json_response(stream, 500, &body.to_string())?;
            return Err(err);
        }
    };

    if with_query {
        let query = detect_request.query.unwrap_or_default();
        let result = advisor.process_query(&detected.detections, detected.frame, &query);
        log::info!(
            "query '{}' over {} detections",
            query,
            result.detections.len()
        );
        let mut detections = result.detections;
        detections.truncate(MAX_QUERY_DETECTIONS);
        let response = QueryResponse {
            message: result.advisory,
            query,
            detections,
        };
        let payload = serde_json::to_vec(&response)?;
        write_response(stream, 200, "application/json", &payload)
    } else {
        let result = advisor.process_frame(&detected.detections, detected.frame);
        log::info!(
            "detected {} objects, {} important",
            detected.detections.len(),
            result.ranked.len()
        );
        let response = DetectResponse {
            message: result.advisory,
            detections: result.ranked,
            frame_width: detected.frame.width(),
            frame_height: detected.frame.height(),
        };
        let payload = serde_json::to_vec(&response)?;
        write_response(stream, 200, "application/json", &payload)
    }
}

#[derive(Debug, Deserialize)]
struct DetectRequest {
    /// Base64-encoded image, with or without a data-URL prefix.
    image: String,
    min_confidence: Option<f32>,
    #[serde(default)]
    query: Option<String>,
}

#[derive(Debug, Serialize)]
struct DetectResponse {
    message: String,
    detections: Vec<EnrichedDetection>,
    frame_width: u32,
    frame_height: u32,
}

#[derive(Debug, Serialize)]
struct QueryResponse {
    message: String,
    query: String,
    detections: Vec<EnrichedDetection>,
}

fn decode_image_payload(payload: &str) -> Result<Vec<u8>> {
    // Strip a "data:image/...;base64," prefix when present.
    let encoded = payload
        .split_once(',')
        .map(|(_, rest)| rest)
        .unwrap_or(payload);
    Ok(base64::engine::general_purpose::STANDARD.decode(encoded.trim())?)
}

fn read_request(stream: &mut TcpStream) -> Result<HttpRequest> {
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    let mut buf = [0u8; 4096];
    let mut data = Vec::new();
    let header_end = loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            return Err(anyhow!("connection closed before headers"));
        }
        data.extend_from_slice(&buf[..n]);
        if data.len() > MAX_REQUEST_BYTES {
            return Err(anyhow!("request too large"));
        }
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().ok_or_else(|| anyhow!("empty request"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().ok_or_else(|| anyhow!("missing method"))?;
    let raw_path = parts.next().ok_or_else(|| anyhow!("missing path"))?;
    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            headers.insert(k.trim().to_lowercase(), v.trim().to_string());
        }
    }

    let content_length: usize = headers
        .get("content-length")
        .map(|v| v.parse())
        .transpose()
        .map_err(|_| anyhow!("invalid content-length"))?
        .unwrap_or(0);
    let body_start = header_end + 4;
    if body_start + content_length > MAX_REQUEST_BYTES {
        return Err(anyhow!("request too large"));
    }
    while data.len() < body_start + content_length {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            return Err(anyhow!("connection closed mid-body"));
        }
        data.extend_from_slice(&buf[..n]);
    }
    let body = data[body_start..body_start + content_length].to_vec();

    let path = raw_path.split('?').next().unwrap_or(raw_path).to_string();
    Ok(HttpRequest {
        method: method.to_string(),
        path,
        body,
    })
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
        400 => "HTTP/1.1 400 Bad Request",
        404 => "HTTP/1.1 404 Not Found",
        405 => "HTTP/1.1 405 Method Not Allowed",
        503 => "HTTP/1.1 503 Service Unavailable",
        _ => "HTTP/1.1 500 Internal Server Error",
    };
    let header = format!(
        "{status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {len}\r\nCache-Control: no-store\r\n\r\n",
        status_line = status_line,
        content_type = content_type,
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
