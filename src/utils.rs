//! Utility functions and constants
//!
//! **Why**: Centralized helpers used across multiple modules
//!
//! **Used by**: parser, widgets, main

/// Document file type detection
pub mod formats {
    use std::path::Path;

    /// Supported Photoshop document extensions
    pub const PSD_EXTS: &[&str] = &["psd", "psb"];

    /// Check if file has a Photoshop document extension
    pub fn is_psd(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| PSD_EXTS.contains(&s.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

/// Format a byte count for display ("3.2 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let bytes = bytes as f64;
    if bytes >= GB {
        format!("{:.1} GB", bytes / GB)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_is_psd() {
        assert!(formats::is_psd(Path::new("art.psd")));
        assert!(formats::is_psd(Path::new("big/Art.PSB")));
        assert!(!formats::is_psd(Path::new("photo.png")));
        assert!(!formats::is_psd(Path::new("noext")));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(100 * 1024 * 1024), "100.0 MB");
    }
}
