use std::fmt::{self, Debug, Formatter};
use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use http::{HeaderMap, Method, Request, Response, StatusCode, Uri};
use megaplan_core::{Context, HttpSend, Result, StaticEnv};
use megaplan_file_tokio::{TokioFileRead, TokioFileWrite};
use serde_json::{json, Value};

type Handler = dyn Fn(&Recorded) -> Response<Bytes> + Send + Sync;

/// A request as the transport received it.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .map(|v| v.to_str().unwrap())
            .unwrap_or_default()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HttpSend answering from a handler and keeping every request it saw.
#[derive(Clone)]
pub struct MockHttpSend {
    handler: Arc<Handler>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Debug for MockHttpSend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockHttpSend")
            .field("requests", &self.requests.lock().unwrap().len())
            .finish()
    }
}

impl MockHttpSend {
    pub fn new(handler: impl Fn(&Recorded) -> Response<Bytes> + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            requests: Arc::default(),
        }
    }

    /// Answer `req` without recording it.
    pub fn respond(&self, req: &Recorded) -> Response<Bytes> {
        (self.handler)(req)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("no request was sent")
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.path() == path)
            .count()
    }

    /// Context sending through this mock with real tokio file access.
    pub fn context(&self) -> Context {
        Context::new()
            .with_file_read(TokioFileRead)
            .with_file_write(TokioFileWrite)
            .with_http_send(self.clone())
            .with_env(StaticEnv::default())
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let (parts, body) = req.into_parts();
        let recorded = Recorded {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        };
        let resp = (self.handler)(&recorded);
        self.requests.lock().unwrap().push(recorded);
        Ok(resp)
    }
}

pub fn json_response(status: StatusCode, body: Value) -> Response<Bytes> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Bytes::from(body.to_string()))
        .unwrap()
}

pub fn legacy_ok(data: Value) -> Response<Bytes> {
    json_response(
        StatusCode::OK,
        json!({"status": {"code": "ok", "message": null}, "data": data}),
    )
}

pub fn legacy_error(message: &str) -> Response<Bytes> {
    json_response(
        StatusCode::OK,
        json!({"status": {"code": "error", "message": message}}),
    )
}

pub fn modern_ok(data: Value) -> Response<Bytes> {
    json_response(
        StatusCode::OK,
        json!({"meta": {"status": 200, "errors": [], "pagination": []}, "data": data}),
    )
}

pub fn not_found() -> Response<Bytes> {
    json_response(StatusCode::NOT_FOUND, json!({"error": "not found"}))
}

pub fn gzip(content: &[u8]) -> Bytes {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    Bytes::from(encoder.finish().unwrap())
}
