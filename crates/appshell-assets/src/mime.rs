//! Extension to MIME type lookup.
//!
//! Only the three file types a bundled frontend needs to boot are mapped;
//! the renderer sniffs everything else.

use std::path::Path;

/// MIME type for a path, by its lowercased extension. Unmapped
/// extensions, and paths without one, yield an empty string.
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("html") => "text/html",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_extensions() {
        assert_eq!(mime_type_for(Path::new("index.html")), "text/html");
        assert_eq!(mime_type_for(Path::new("assets/index-4f2a.js")), "text/javascript");
        assert_eq!(mime_type_for(Path::new("assets/style.css")), "text/css");
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(mime_type_for(Path::new("INDEX.HTML")), "text/html");
        assert_eq!(mime_type_for(Path::new("app.Js")), "text/javascript");
    }

    #[test]
    fn test_unmapped_extensions() {
        assert_eq!(mime_type_for(Path::new("logo.png")), "");
        assert_eq!(mime_type_for(Path::new("module.mjs")), "");
        assert_eq!(mime_type_for(Path::new("LICENSE")), "");
        assert_eq!(mime_type_for(Path::new(".htaccess")), "");
        assert_eq!(mime_type_for(Path::new("trailing.")), "");
    }
}
