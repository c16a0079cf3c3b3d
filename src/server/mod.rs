//! HTTP upload service
//!
//! `POST /file-upload` takes a multipart form with a `document` field and
//! answers with `{"frameCount": n}` or `{code, message, parameter?}`.

pub mod multipart;

use std::io::Read;
use std::net::SocketAddr;
use std::time::Instant;

use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, ErrorCode, ServerError, DOCUMENT_PARAMETER};
use crate::scanner::{self, SliceSource};

pub const UPLOAD_PATH: &str = "/file-upload";
pub const HEALTH_PATH: &str = "/health";

const ACCEPTED_MIME_TYPE: &str = "audio/mpeg";
const UNSUPPORTED_TYPE_MESSAGE: &str = "Only MPEG Version 1 Layer III files are supported.";
const MISSING_DOCUMENT_MESSAGE: &str = "The document field is required.";

/// Request body allowance on top of the document cap, for boundaries,
/// part headers and small extra fields.
const FORM_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Status and JSON body of a response, independent of the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// `Null` means no body.
    pub body: serde_json::Value,
    pub headers: Vec<(&'static str, &'static str)>,
}

impl ApiResponse {
    fn ok<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => ApiResponse {
                status: 200,
                body,
                headers: Vec::new(),
            },
            Err(e) => {
                error!(error = %e, "failed to serialize response");
                Self::from(AppError::internal())
            }
        }
    }

    /// CORS preflight answer for the upload route.
    fn preflight() -> Self {
        ApiResponse {
            status: 204,
            body: serde_json::Value::Null,
            headers: vec![
                ("Access-Control-Allow-Methods", "POST"),
                ("Access-Control-Allow-Headers", "Content-Type"),
            ],
        }
    }
}

impl From<AppError> for ApiResponse {
    fn from(err: AppError) -> Self {
        let body = serde_json::to_value(&err).unwrap_or_else(|_| serde_json::json!({}));
        ApiResponse {
            status: err.http_status,
            body,
            headers: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameCountResponse {
    frame_count: u64,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub struct UploadServer {
    server: Server,
    config: Config,
}

impl UploadServer {
    pub fn bind(config: Config) -> Result<Self, ServerError> {
        let addr = config.bind_addr();
        let server = Server::http(&addr).map_err(|e| ServerError::Bind {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;
        Ok(UploadServer { server, config })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests until [`UploadServer::unblock`] is called.
    pub fn run(&self) {
        if let Some(addr) = self.local_addr() {
            info!(%addr, "listening for uploads");
        }

        for request in self.server.incoming_requests() {
            self.handle(request);
        }
    }

    pub fn unblock(&self) {
        self.server.unblock();
    }

    fn handle(&self, mut request: Request) {
        let request_id = Uuid::new_v4();
        let method = request.method().clone();
        let url = request.url().to_string();
        let span = info_span!("request", id = %request_id, %method, %url);
        let _enter = span.enter();
        let started = Instant::now();

        let content_type = header_value(&request, "Content-Type");
        let response = route(
            &method,
            &url,
            content_type.as_deref(),
            request.as_reader(),
            &self.config,
        );

        info!(
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );

        let request_id = request_id.to_string();
        let mut headers = vec![
            ("Access-Control-Allow-Origin", "*"),
            ("X-Request-Id", request_id.as_str()),
        ];
        headers.extend(response.headers.iter().copied());

        let body = if response.body.is_null() {
            String::new()
        } else {
            headers.push(("Content-Type", "application/json"));
            response.body.to_string()
        };

        let mut http = Response::from_string(body).with_status_code(response.status);
        for (field, value) in headers {
            if let Ok(header) = Header::from_bytes(field.as_bytes(), value.as_bytes()) {
                http.add_header(header);
            }
        }

        if let Err(e) = request.respond(http) {
            warn!(error = %e, "failed to send response");
        }
    }
}

/// Dispatch one request.
pub fn route(
    method: &Method,
    url: &str,
    content_type: Option<&str>,
    body: &mut dyn Read,
    config: &Config,
) -> ApiResponse {
    let path = url.split('?').next().unwrap_or_default();

    match (method, path) {
        (Method::Post, UPLOAD_PATH) => match handle_upload(content_type, body, config) {
            Ok(frame_count) => ApiResponse::ok(&FrameCountResponse { frame_count }),
            Err(err) => err.into(),
        },
        (Method::Options, UPLOAD_PATH) => ApiResponse::preflight(),
        (Method::Get, HEALTH_PATH) => ApiResponse::ok(&HealthResponse { status: "ok" }),
        (_, UPLOAD_PATH) | (_, HEALTH_PATH) => AppError::new(
            ErrorCode::MethodNotAllowed,
            format!("Method {} is not allowed for {}", method, path),
        )
        .into(),
        _ => AppError::new(
            ErrorCode::NotFound,
            format!("Route {}:{} not found", method, path),
        )
        .into(),
    }
}

/// Validate the upload and count the frames of its `document` field.
pub fn handle_upload(
    content_type: Option<&str>,
    body: &mut dyn Read,
    config: &Config,
) -> Result<u64, AppError> {
    let missing_document = || AppError::invalid_request(MISSING_DOCUMENT_MESSAGE, DOCUMENT_PARAMETER);

    let boundary = content_type
        .ok_or(multipart::MultipartError::MissingBoundary)
        .and_then(multipart::boundary)
        .map_err(|e| {
            warn!(error = %e, "upload is not a multipart form");
            missing_document()
        })?;

    let raw = read_limited(
        body,
        config.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES),
        config.max_upload_bytes,
    )?;
    let parts = multipart::parse(&raw, &boundary).map_err(|e| {
        warn!(error = %e, "unable to parse multipart form");
        missing_document()
    })?;

    let document = multipart::find_field(&parts, DOCUMENT_PARAMETER).ok_or_else(missing_document)?;

    if document.mime_type().as_deref() != Some(ACCEPTED_MIME_TYPE) {
        warn!(mime_type = ?document.mime_type(), "rejected document type");
        return Err(AppError::invalid_request(
            UNSUPPORTED_TYPE_MESSAGE,
            DOCUMENT_PARAMETER,
        ));
    }

    if document.data.len() as u64 > config.max_upload_bytes {
        warn!(bytes = document.data.len(), "document exceeds the upload limit");
        return Err(too_large(config.max_upload_bytes));
    }

    info!(
        filename = document.filename.as_deref().unwrap_or("-"),
        bytes = document.data.len(),
        "counting frames"
    );

    scanner::count_frames(SliceSource::new(document.data, config.chunk_size)).map_err(|e| {
        warn!(error = %e, "document rejected");
        AppError::from(e)
    })
}

/// Read at most `limit` bytes of the request body. `max_document` is only
/// used for the error message.
fn read_limited(body: &mut dyn Read, limit: u64, max_document: u64) -> Result<Vec<u8>, AppError> {
    let mut raw = Vec::new();
    body.take(limit.saturating_add(1))
        .read_to_end(&mut raw)
        .map_err(|e| {
            error!(error = %e, "failed to read request body");
            AppError::internal()
        })?;

    if raw.len() as u64 > limit {
        warn!(limit, "request body exceeds the upload limit");
        return Err(too_large(max_document));
    }

    Ok(raw)
}

fn too_large(max_document: u64) -> AppError {
    AppError::invalid_request(
        format!(
            "The document exceeds the maximum upload size of {} bytes.",
            max_document
        ),
        DOCUMENT_PARAMETER,
    )
}

fn header_value(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().to_string())
}
