use crossbeam::channel::{self, Receiver, Sender};
use std::path::PathBuf;
use std::thread;

use crate::mesh::{self, SceneModel};

/// Completion event for an asynchronous model load. Carries the request id
/// so the viewer can discard completions of superseded requests.
pub enum LoadEvent {
    Loaded {
        request_id: u64,
        name: String,
        model: Box<SceneModel>,
    },
    Failed {
        request_id: u64,
        name: String,
        message: String,
    },
}

impl LoadEvent {
    pub fn request_id(&self) -> u64 {
        match self {
            LoadEvent::Loaded { request_id, .. } | LoadEvent::Failed { request_id, .. } => {
                *request_id
            }
        }
    }
}

/// Issues model loads on worker threads and hands completions back to the
/// render thread over a channel.
pub struct Loader {
    tx: Sender<LoadEvent>,
    rx: Receiver<LoadEvent>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    /// Issue a load; returns immediately. The completion arrives later via
    /// `try_next` on the render thread.
    pub fn spawn(&self, request_id: u64, name: String, path: PathBuf) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let event = match mesh::load_model(&path) {
                Ok(model) => LoadEvent::Loaded {
                    request_id,
                    name,
                    model: Box::new(model),
                },
                Err(e) => LoadEvent::Failed {
                    request_id,
                    name,
                    message: e.to_string(),
                },
            };
            // A send failure means the viewer is gone; nothing to report
            let _ = tx.send(event);
        });
    }

    /// Non-blocking drain of pending completions
    pub fn try_next(&self) -> Option<LoadEvent> {
        self.rx.try_recv().ok()
    }

    #[cfg(test)]
    fn recv_timeout(&self, timeout: std::time::Duration) -> Option<LoadEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_file_reports_failure_with_request_id() {
        let loader = Loader::new();
        loader.spawn(7, "Ghost".to_string(), PathBuf::from("does-not-exist.glb"));

        match loader.recv_timeout(Duration::from_secs(10)) {
            Some(LoadEvent::Failed {
                request_id, name, ..
            }) => {
                assert_eq!(request_id, 7);
                assert_eq!(name, "Ghost");
            }
            Some(LoadEvent::Loaded { .. }) => panic!("load of a missing file succeeded"),
            None => panic!("no completion arrived"),
        }
    }

    #[test]
    fn test_unsupported_extension_reports_failure() {
        let loader = Loader::new();
        loader.spawn(1, "Readme".to_string(), PathBuf::from("README.txt"));

        match loader.recv_timeout(Duration::from_secs(10)) {
            Some(event) => {
                assert_eq!(event.request_id(), 1);
                assert!(matches!(event, LoadEvent::Failed { .. }));
            }
            None => panic!("no completion arrived"),
        }
    }
}
