//! Shared file dialog helpers for widget UI.

/// Create configured file dialog for PSD/PSB selection.
pub fn create_document_dialog(title: &str) -> rfd::FileDialog {
    rfd::FileDialog::new()
        .add_filter("Photoshop Document", crate::utils::formats::PSD_EXTS)
        .set_title(title)
}
