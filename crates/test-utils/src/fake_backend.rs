use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use myst::engine::{RebuildBackend, RebuildCommand};
use myst::errors::{MystError, Result};
use myst::render::BuildReport;

/// Lets a test observe when a gated rebuild starts and decide when it ends.
pub struct FakeGate {
    pub started: mpsc::UnboundedReceiver<RebuildCommand>,
    pub release: mpsc::UnboundedSender<()>,
}

/// A fake rebuild backend that:
/// - records every command it was asked to run
/// - optionally waits for the test to release each rebuild
/// - optionally fails every rebuild.
pub struct FakeBackend {
    executed: Arc<Mutex<Vec<RebuildCommand>>>,
    started: Option<mpsc::UnboundedSender<RebuildCommand>>,
    release: Option<mpsc::UnboundedReceiver<()>>,
    fail_with: Option<String>,
}

impl FakeBackend {
    pub fn new(executed: Arc<Mutex<Vec<RebuildCommand>>>) -> Self {
        Self {
            executed,
            started: None,
            release: None,
            fail_with: None,
        }
    }

    /// A backend whose rebuilds block until the test sends on `release`.
    pub fn gated(executed: Arc<Mutex<Vec<RebuildCommand>>>) -> (Self, FakeGate) {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let (release_tx, release_rx) = mpsc::unbounded_channel();
        let backend = Self {
            executed,
            started: Some(started_tx),
            release: Some(release_rx),
            fail_with: None,
        };
        (
            backend,
            FakeGate {
                started: started_rx,
                release: release_tx,
            },
        )
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }
}

impl RebuildBackend for FakeBackend {
    fn rebuild(
        &mut self,
        command: RebuildCommand,
    ) -> Pin<Box<dyn Future<Output = Result<BuildReport>> + Send + '_>> {
        Box::pin(async move {
            self.executed.lock().unwrap().push(command.clone());

            if let Some(started) = &self.started {
                let _ = started.send(command);
            }
            if let Some(release) = &mut self.release {
                release.recv().await;
            }

            match &self.fail_with {
                Some(message) => Err(MystError::Other(anyhow::anyhow!(message.clone()))),
                None => Ok(BuildReport {
                    written: 1,
                    ..BuildReport::default()
                }),
            }
        })
    }
}
