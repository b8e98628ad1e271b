use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::EchoClient;
use crate::credentials::CredentialStore;
use crate::error::{ServiceError, ServiceResult};
use crate::output::OutputSink;
use crate::types::Outcome;

/// Ends an interactive session.
pub const QUIT: &str = ":q";

/// Turns one "send" trigger into an authenticated echo request and renders
/// the result to the sink.
///
/// Invocations are independent: nothing stops a second one from starting
/// while the first is in flight, and whichever finishes last owns the sink.
#[derive(Clone)]
pub struct RequestHandler {
    client: Arc<EchoClient>,
    credentials: Arc<dyn CredentialStore>,
    sink: Arc<dyn OutputSink>,
    in_flight: Arc<AtomicUsize>,
}

impl RequestHandler {
    pub fn new(
        client: EchoClient,
        credentials: Arc<dyn CredentialStore>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            credentials,
            sink,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run one invocation to completion. Never fails: every error becomes a
    /// rendered `Outcome::Failure`.
    pub async fn send(&self, user_text: String) -> Outcome {
        let token = self.load_token();
        let client = self.client.clone();
        let guard = InFlight::enter(&self.in_flight);
        let pending = guard.count;
        info!(
            url = %client.echo_url(),
            chars = user_text.chars().count(),
            in_flight = pending,
            "sending echo request"
        );

        let result = tokio::task::spawn_blocking(move || {
            client.send_echo(&user_text, token.as_deref())
        })
        .await
        .unwrap_or_else(|e| Err(ServiceError::Network(format!("request task failed: {e}"))));
        drop(guard);

        let outcome = match result {
            Ok(reply) => {
                debug!(
                    username = reply.username.as_deref().unwrap_or(""),
                    user_text = reply.user_text.as_deref().unwrap_or(""),
                    gpt_reply = reply.gpt_reply.as_deref().unwrap_or(""),
                    "echo reply received"
                );
                Outcome::Message(reply.formatted_message)
            }
            Err(err) => {
                match &err {
                    ServiceError::Http { status, .. } => {
                        warn!(status, error = %err, "echo request rejected")
                    }
                    _ => warn!(error = %err, "echo request failed"),
                }
                Outcome::Failure(err.to_string())
            }
        };

        self.sink.render(&outcome);
        outcome
    }

    /// Fire an invocation without waiting for it.
    pub fn spawn_send(&self, user_text: String) -> JoinHandle<Outcome> {
        let handler = self.clone();
        tokio::spawn(async move { handler.send(user_text).await })
    }

    /// Interactive loop: each line from `next_line` is sent at once, without
    /// waiting for earlier requests. Stops on an empty line, [`QUIT`], or a
    /// line-source error; outstanding requests are awaited in every case and
    /// the line-source error, if any, is returned afterwards.
    pub async fn run_session<F, Fut>(&self, mut next_line: F) -> ServiceResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ServiceResult<String>>,
    {
        let mut pending = Vec::new();
        let mut failure = None;
        loop {
            match next_line().await {
                Ok(line) if line.is_empty() || line == QUIT => break,
                Ok(line) => {
                    pending.retain(|task: &JoinHandle<Outcome>| !task.is_finished());
                    pending.push(self.spawn_send(line));
                }
                Err(err) => {
                    warn!(error = %err, "input ended unexpectedly");
                    failure = Some(err);
                    break;
                }
            }
        }

        if self.in_flight() > 0 {
            info!(in_flight = self.in_flight(), "waiting for outstanding requests");
        }
        for task in pending {
            if let Err(e) = task.await {
                warn!(error = %e, "request task ended abnormally");
            }
        }
        failure.map_or(Ok(()), Err)
    }

    fn load_token(&self) -> Option<String> {
        match self.credentials.load() {
            Ok(Some(token)) => Some(token),
            Ok(None) => {
                warn!(
                    source = %self.credentials.describe(),
                    "no token stored; sending placeholder"
                );
                None
            }
            Err(err) => {
                warn!(error = %err, "failed to read token; sending placeholder");
                None
            }
        }
    }
}

/// Counts one in-flight request for as long as it lives, including when the
/// owning future is dropped mid-await.
struct InFlight<'a> {
    counter: &'a AtomicUsize,
    count: usize,
}

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Self { counter, count }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
