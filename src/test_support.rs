//! In-process stand-in for the Echoes backend used by unit tests.
//!
//! A hyper HTTP/1 server on its own thread and runtime, so both blocking and
//! `#[tokio::test]` tests can call it. Each accepted connection is answered
//! with the next canned response and the request it carried is recorded.

use std::convert::Infallible;
use std::net::TcpListener;
use std::pin::pin;
use std::sync::{Arc, Mutex};
use std::thread;

use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;

#[derive(Clone, Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct CannedResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl CannedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_string(),
        }
    }
}

pub struct StubBackend {
    pub base_url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl StubBackend {
    pub fn serve(responses: Vec<CannedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();

        let worker = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                let mut connections = Vec::new();
                for canned in responses {
                    let Ok((stream, _)) = listener.accept().await else {
                        break;
                    };
                    let io = TokioIo::new(stream);
                    let sink = sink.clone();
                    let service = service_fn(move |req: Request<Incoming>| {
                        answer(req, canned.clone(), sink.clone())
                    });
                    connections.push(tokio::spawn(async move {
                        let _ = http1::Builder::new().serve_connection(io, service).await;
                    }));
                }
                for connection in connections {
                    let _ = connection.await;
                }
            });
        });

        Self {
            base_url,
            captured,
            worker: Some(worker),
        }
    }

    /// Waits until every canned response has been served.
    pub fn finish(mut self) -> Vec<CapturedRequest> {
        if let Some(worker) = self.worker.take() {
            worker.join().unwrap();
        }
        self.captured.lock().unwrap().clone()
    }
}

/// A base URL nothing is listening on.
pub fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn answer(
    req: Request<Incoming>,
    canned: CannedResponse,
    sink: Arc<Mutex<Vec<CapturedRequest>>>,
) -> Result<Response<String>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = read_body(body).await;
    sink.lock().unwrap().push(CapturedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        headers: parts
            .headers
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let mut response = Response::new(canned.body);
    *response.status_mut() = hyper::StatusCode::from_u16(canned.status).unwrap();
    let headers = response.headers_mut();
    headers.insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static(canned.content_type),
    );
    headers.insert(
        hyper::header::CONNECTION,
        hyper::header::HeaderValue::from_static("close"),
    );
    Ok(response)
}

async fn read_body(body: Incoming) -> Vec<u8> {
    let mut body = pin!(body);
    let mut out = Vec::new();
    while let Some(frame) = std::future::poll_fn(|cx| body.as_mut().poll_frame(cx)).await {
        let Ok(frame) = frame else { break };
        if let Ok(data) = frame.into_data() {
            out.extend_from_slice(&data);
        }
    }
    out
}
