//! In-memory transport used by the catalog unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{FetchError, Result};
use crate::transport::{HttpResponse, Transport};

/// What a scripted URL answers
#[derive(Debug, Clone)]
pub enum Reply {
    Body(Vec<u8>),
    Status(u16),
    Fail(FetchError),
    /// Never answers
    Hang,
    /// Panics inside the request
    Panic,
}

#[derive(Debug, Clone)]
struct Route {
    reply: Reply,
    delay: Duration,
}

/// Answers GETs from a per-URL script and counts request lifecycles
///
/// Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: HashMap<String, Route>,
    started: AtomicUsize,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: impl Into<String>, reply: Reply) -> Self {
        self.route_delayed(url, reply, Duration::ZERO)
    }

    pub fn route_delayed(mut self, url: impl Into<String>, reply: Reply, delay: Duration) -> Self {
        self.routes.insert(url.into(), Route { reply, delay });
        self
    }

    /// Requests that returned an answer
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Requests started but neither answered nor dropped
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight count however the request ends
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, max_bytes: usize) -> Result<HttpResponse> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let route = self.routes.get(url).cloned().unwrap_or(Route {
            reply: Reply::Status(404),
            delay: Duration::ZERO,
        });

        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }

        let result = match route.reply {
            Reply::Body(body) if body.len() > max_bytes => {
                Err(FetchError::TooLarge { limit: max_bytes })
            }
            Reply::Body(body) => Ok(HttpResponse::ok(body)),
            Reply::Status(status) => Ok(HttpResponse::status(status)),
            Reply::Fail(e) => Err(e),
            Reply::Hang => std::future::pending().await,
            Reply::Panic => panic!("scripted panic for {}", url),
        };

        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}
