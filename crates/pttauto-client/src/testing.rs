//! Scripted transport and notifier doubles for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Duration;

use pttauto_core::error::{Error, Result};

use crate::notify::Notifier;
use crate::transport::{Dialer, Link};

/// Blueprint for one scripted link.
pub struct MockLinkSpec {
    reads: Vec<String>,
    healthy: bool,
    write_ok: bool,
}

impl MockLinkSpec {
    /// A healthy link serving the given screens, one per read, then
    /// empty reads (timeouts).
    pub fn with_reads(reads: Vec<String>) -> Self {
        Self {
            reads,
            healthy: true,
            write_ok: true,
        }
    }

    /// Report unhealthy at health-check time.
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Fail every write at the link level.
    pub fn failing_writes(mut self) -> Self {
        self.write_ok = false;
        self
    }
}

/// Shared script state: dial outcomes in, observed traffic out.
#[derive(Clone, Default)]
pub struct MockScript {
    links: Arc<Mutex<VecDeque<MockLinkSpec>>>,
    dial_log: Arc<Mutex<Vec<String>>>,
    writes: Arc<Mutex<Vec<String>>>,
    closes: Arc<Mutex<usize>>,
}

impl MockScript {
    /// Queue a link for the next successful dial. Dials beyond the
    /// queue fail.
    pub fn push_link(&self, spec: MockLinkSpec) {
        self.links.lock().unwrap().push_back(spec);
    }

    /// Hosts dialed, in order.
    pub fn dial_log(&self) -> Vec<String> {
        self.dial_log.lock().unwrap().clone()
    }

    /// Text written through any link, in order.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    /// Number of link closes observed.
    pub fn close_count(&self) -> usize {
        *self.closes.lock().unwrap()
    }
}

/// Dialer that replays a `MockScript`.
pub struct MockDialer {
    script: MockScript,
}

impl MockDialer {
    pub fn new(script: MockScript) -> Self {
        Self { script }
    }
}

#[async_trait]
impl Dialer for MockDialer {
    type Link = MockLink;

    async fn dial(&self, host: &str, _overall_timeout: Duration) -> Result<MockLink> {
        self.script.dial_log.lock().unwrap().push(host.to_string());
        match self.script.links.lock().unwrap().pop_front() {
            Some(spec) => Ok(MockLink {
                reads: spec.reads.into(),
                healthy: spec.healthy,
                write_ok: spec.write_ok,
                script: self.script.clone(),
            }),
            None => Err(Error::Transport {
                message: "scripted dial failure".into(),
            }),
        }
    }
}

/// Link that returns scripted screens and records writes.
pub struct MockLink {
    reads: VecDeque<String>,
    healthy: bool,
    write_ok: bool,
    script: MockScript,
}

#[async_trait]
impl Link for MockLink {
    async fn read_chunk(&mut self, _max_bytes: usize, _timeout: Duration) -> String {
        self.reads.pop_front().unwrap_or_default()
    }

    async fn write_all(&mut self, text: &str, _timeout: Duration) -> Result<()> {
        if self.write_ok {
            self.script.writes.lock().unwrap().push(text.to_string());
            Ok(())
        } else {
            Err(Error::Transport {
                message: "scripted write failure".into(),
            })
        }
    }

    fn is_healthy(&self) -> bool {
        self.healthy
    }

    async fn close(&mut self) {
        *self.script.closes.lock().unwrap() += 1;
    }
}

/// Notifier that records messages for assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) -> bool {
        self.messages.lock().unwrap().push(text.to_string());
        true
    }
}
