//! Document store - the single holder of viewer state.
//!
//! Owns the currently loaded document, the selected layer identity, the
//! load/error slots and the load-generation counter. Only the UI thread
//! touches it.
//!
//! # Contracts
//!
//! - Installing a document is always wholesale; selection and error state
//!   reset with it.
//! - Absent lookups degrade to `None`/no-op, never an error.
//! - Every overlapping load carries the generation current at request
//!   time; a result whose generation is stale by commit time is discarded,
//!   so the last *requested* load wins, not the last one to settle.

use log::{debug, info};
use uuid::Uuid;

use crate::entities::{Layer, LayerCounts, PsdDocument};
use crate::parser::ParseError;

/// Viewer state holder
#[derive(Debug, Default)]
pub struct DocumentStore {
    current: Option<PsdDocument>,
    selected_layer_id: Option<Uuid>,
    loading: bool,
    error: Option<String>,
    /// Bumped by `begin_load`; commits must match
    load_generation: u64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_file(&self) -> Option<&PsdDocument> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the active document wholesale; clears selection and error.
    ///
    /// No validation happens here - the parser adapter is trusted.
    pub fn set_current_file(&mut self, doc: PsdDocument) {
        info!("Document loaded: {} ({} layers)", doc.name, doc.layer_counts().total);
        self.current = Some(doc);
        self.selected_layer_id = None;
        self.error = None;
        self.loading = false;
    }

    /// Drop the document and all derived state
    pub fn clear_file(&mut self) {
        self.current = None;
        self.selected_layer_id = None;
        self.error = None;
        self.loading = false;
    }

    /// Record the selection without verifying the id exists; lookup is
    /// performed lazily by `selected_layer`
    pub fn select_layer(&mut self, id: Uuid) {
        self.selected_layer_id = Some(id);
    }

    pub fn selected_layer_id(&self) -> Option<Uuid> {
        self.selected_layer_id
    }

    /// Pre-order search for the selected node; `None` when no file is
    /// loaded, nothing is selected, or the identity is absent
    pub fn selected_layer(&self) -> Option<&Layer> {
        let doc = self.current.as_ref()?;
        let id = self.selected_layer_id?;
        doc.find_layer(id)
    }

    /// Recursive total/visible/hidden tally; zeros without a document
    pub fn layer_counts(&self) -> LayerCounts {
        self.current
            .as_ref()
            .map(|doc| doc.layer_counts())
            .unwrap_or_default()
    }

    /// Flip one layer's visibility via the document's copy-on-write path.
    ///
    /// Installs a replacement document (fresh revision) so observers can
    /// key redraws off the change. Unknown ids leave the store untouched;
    /// returns whether a toggle happened.
    pub fn toggle_layer_visibility(&mut self, id: Uuid) -> bool {
        let Some(doc) = self.current.as_ref() else {
            return false;
        };
        match doc.with_visibility_toggled(id) {
            Some(next) => {
                self.current = Some(next);
                true
            }
            None => {
                debug!("toggle_layer_visibility: unknown layer id {}", id);
                false
            }
        }
    }

    /// Install a recomposited preview on the current document (wholesale
    /// replacement, fresh revision)
    pub fn set_preview(&mut self, preview: Option<String>) {
        if let Some(doc) = self.current.as_ref() {
            self.current = Some(doc.with_preview(preview));
        }
    }

    pub fn set_error(&mut self, message: Option<String>) {
        self.error = message;
    }

    /// Start a new load: bumps the generation, flags loading, clears the
    /// previous error. Returns the token the result must carry.
    pub fn begin_load(&mut self) -> u64 {
        self.load_generation += 1;
        self.loading = true;
        self.error = None;
        self.load_generation
    }

    /// Commit a finished load if its generation is still current.
    ///
    /// Stale results (superseded by a newer `begin_load`) are discarded
    /// entirely - including their errors. Returns whether the result was
    /// applied.
    pub fn finish_load(&mut self, generation: u64, result: Result<PsdDocument, ParseError>) -> bool {
        if generation != self.load_generation {
            debug!(
                "Discarding stale load result: generation {} != current {}",
                generation, self.load_generation
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(doc) => self.set_current_file(doc),
            Err(e) => self.error = Some(e.to_string()),
        }
        true
    }
}
