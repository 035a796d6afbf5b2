//! Standalone export of a generated artifact
//!
//! Wraps markup, stylesheet and script into a complete HTML document that
//! loads Tailwind from its CDN, and packages it as `index.html` in a zip.

use std::io::{Seek, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::Result;
use crate::types::GeneratedCode;

/// Tailwind CDN script the generated markup relies on
pub const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

/// Title used when the project has no name
pub const DEFAULT_TITLE: &str = "SiteCraft Project";

/// Name of the document inside exported archives
pub const INDEX_FILE: &str = "index.html";

fn title_or_default(title: Option<&str>) -> &str {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => DEFAULT_TITLE,
    }
}

/// Render a complete HTML document for the artifact
pub fn render_document(code: &GeneratedCode, title: Option<&str>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{tailwind}"></script>
    <style>{css}</style>
</head>
<body>
    {html}
    <script>{javascript}</script>
</body>
</html>"#,
        title = title_or_default(title),
        tailwind = TAILWIND_CDN,
        css = code.css,
        html = code.html,
        javascript = code.javascript,
    )
}

/// File name for an exported archive: `<name>.zip`, or `project.zip`
pub fn archive_file_name(name: Option<&str>) -> String {
    let stem: String = name
        .map(str::trim)
        .unwrap_or_default()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();

    if stem.is_empty() {
        "project.zip".to_string()
    } else {
        format!("{}.zip", stem)
    }
}

/// Write a zip archive holding the rendered document as `index.html`
pub fn export_zip<W: Write + Seek>(
    code: &GeneratedCode,
    title: Option<&str>,
    writer: W,
) -> Result<W> {
    let document = render_document(code, title);

    let mut zip = ZipWriter::new(writer);
    zip.start_file(INDEX_FILE, SimpleFileOptions::default())?;
    zip.write_all(document.as_bytes())?;
    let writer = zip.finish()?;

    log::info!(
        "Exported '{}' ({} bytes of HTML)",
        title_or_default(title),
        document.len()
    );
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn sample() -> GeneratedCode {
        GeneratedCode::new(
            "<main class=\"p-4\">Hi</main>",
            "main { color: red; }",
            "console.log('ready');",
        )
    }

    #[test]
    fn test_render_document_layout() {
        let doc = render_document(&sample(), Some("Landing"));

        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Landing</title>"));
        assert!(doc.contains("<script src=\"https://cdn.tailwindcss.com\"></script>"));
        assert!(doc.contains("<style>main { color: red; }</style>"));
        assert!(doc.contains("<main class=\"p-4\">Hi</main>"));
        assert!(doc.contains("<script>console.log('ready');</script>"));

        // Markup sits in the body, before the page script
        let body = doc.find("<body>").unwrap();
        let markup = doc.find("<main").unwrap();
        let script = doc.find("<script>console").unwrap();
        assert!(body < markup && markup < script);
    }

    #[test]
    fn test_default_title() {
        let doc = render_document(&GeneratedCode::default(), None);
        assert!(doc.contains("<title>SiteCraft Project</title>"));

        let doc = render_document(&GeneratedCode::default(), Some("   "));
        assert!(doc.contains("<title>SiteCraft Project</title>"));
    }

    #[test]
    fn test_archive_file_name() {
        assert_eq!(archive_file_name(Some("Coffee Shop")), "Coffee Shop.zip");
        assert_eq!(archive_file_name(Some("a/b")), "a_b.zip");
        assert_eq!(archive_file_name(Some("")), "project.zip");
        assert_eq!(archive_file_name(None), "project.zip");
    }

    #[test]
    fn test_export_zip_contains_index() {
        let code = sample();
        let cursor = export_zip(&code, Some("Demo"), Cursor::new(Vec::new())).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), 1);

        let mut entry = archive.by_name(INDEX_FILE).unwrap();
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, render_document(&code, Some("Demo")));
    }
}
