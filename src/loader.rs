//! Background document loading.
//!
//! Reading and decoding a PSD can take seconds; each load request runs on
//! its own one-shot thread and reports back over a crossbeam channel that
//! the UI thread polls once per frame. Results carry the store's
//! generation token - `DocumentStore::finish_load` discards anything
//! superseded by a newer request, so overlapping loads cannot race.

use std::path::PathBuf;
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error};

use crate::entities::PsdDocument;
use crate::parser::{self, ParseError};

/// Outcome of one background load
pub struct LoadResult {
    /// Generation token handed out by `DocumentStore::begin_load`
    pub generation: u64,
    pub path: PathBuf,
    pub result: Result<PsdDocument, ParseError>,
}

/// One-shot background loader
pub struct Loader {
    tx: Sender<LoadResult>,
    rx: Receiver<LoadResult>,
}

impl Loader {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Spawn a load for `path`, tagged with `generation`.
    ///
    /// Never blocks; the result (success or failure) arrives via `poll`.
    pub fn request(&self, generation: u64, path: PathBuf) {
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("psdview-load-{}", generation))
            .spawn(move || {
                debug!("Load {} started: {}", generation, path.display());
                let result = parser::parse_file(&path);
                if let Err(e) = &result {
                    debug!("Load {} failed: {}", generation, e);
                }
                // Send fails only when the app is shutting down
                let _ = tx.send(LoadResult {
                    generation,
                    path,
                    result,
                });
            });

        if let Err(e) = spawned {
            error!("Failed to spawn load thread: {}", e);
        }
    }

    /// Non-blocking: next finished load, if any
    pub fn poll(&self) -> Option<LoadResult> {
        self.rx.try_recv().ok()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_poll_empty_is_none() {
        let loader = Loader::new();
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_request_missing_file_reports_error() {
        let loader = Loader::new();
        loader.request(1, PathBuf::from("/definitely/not/here.psd"));

        // One-shot thread; wait for the result to arrive
        let result = loader
            .rx
            .recv_timeout(Duration::from_secs(5))
            .expect("load result should arrive");
        assert_eq!(result.generation, 1);
        assert!(matches!(result.result, Err(ParseError::Io(_))));
    }
}
