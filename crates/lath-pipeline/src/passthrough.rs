//! Straight copy tasks: plain css, fonts, and static html.

use std::fs;
use std::path::Path;

use crate::config::SiteLayout;
use crate::task::{PipelineError, TaskReport};
use crate::walk;

/// Copy top-level `.css` files into the css output untouched.
pub fn copy_plain_css(layout: &SiteLayout) -> Result<TaskReport, PipelineError> {
    copy_tree(&layout.css_dir(), &layout.out_css_dir(), Some("css"), false)
}

/// Copy the font tree into the fonts output.
pub fn copy_fonts(layout: &SiteLayout) -> Result<TaskReport, PipelineError> {
    copy_tree(&layout.fonts_dir(), &layout.out_fonts_dir(), None, true)
}

/// Copy hand-written `.html` files from anywhere in the source tree,
/// preserving their position relative to the source root.
pub fn copy_static_html(layout: &SiteLayout) -> Result<TaskReport, PipelineError> {
    copy_tree(layout.source_root(), layout.output_root(), Some("html"), true)
}

fn copy_tree(
    from: &Path,
    to: &Path,
    extension: Option<&str>,
    recursive: bool,
) -> Result<TaskReport, PipelineError> {
    let files = match extension {
        Some(ext) => walk::files_with_extension(from, ext, recursive),
        None => walk::all_files(from, recursive),
    };

    let mut written = 0;
    for file in files {
        let rel = file.strip_prefix(from).unwrap_or(&file);
        let dest = to.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::write(parent, e))?;
        }
        fs::copy(&file, &dest).map_err(|e| PipelineError::write(&dest, e))?;
        written += 1;
    }
    Ok(TaskReport { written, skipped: 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture() -> (tempfile::TempDir, SiteLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = SiteLayout::new(dir.path().join("source"), dir.path().join("build"));
        fs::create_dir_all(layout.source_root()).unwrap();
        (dir, layout)
    }

    #[test]
    fn fonts_copy_recursively() {
        let (_dir, layout) = fixture();
        fs::create_dir_all(layout.fonts_dir().join("mono")).unwrap();
        fs::write(layout.fonts_dir().join("body.woff2"), b"body").unwrap();
        fs::write(layout.fonts_dir().join("mono/code.woff2"), b"code").unwrap();

        let report = copy_fonts(&layout).unwrap();
        assert_eq!(report.written, 2);
        assert_eq!(
            fs::read(layout.out_fonts_dir().join("mono/code.woff2")).unwrap(),
            b"code"
        );
    }

    #[test]
    fn plain_css_only_copies_top_level_sheets() {
        let (_dir, layout) = fixture();
        fs::create_dir_all(layout.css_dir().join("vendor")).unwrap();
        fs::write(layout.css_dir().join("legacy.css"), "a{}").unwrap();
        fs::write(layout.css_dir().join("vendor/skip.css"), "b{}").unwrap();
        fs::write(layout.css_dir().join("readme.txt"), "not css").unwrap();

        let report = copy_plain_css(&layout).unwrap();
        assert_eq!(report.written, 1);
        assert!(layout.out_css_dir().join("legacy.css").exists());
        assert!(!layout.out_css_dir().join("vendor/skip.css").exists());
        assert!(!layout.out_css_dir().join("readme.txt").exists());
    }

    #[test]
    fn static_html_keeps_its_place_in_the_tree() {
        let (_dir, layout) = fixture();
        fs::create_dir_all(layout.source_root().join("legal")).unwrap();
        fs::write(layout.source_root().join("404.html"), "<h1>404</h1>").unwrap();
        fs::write(
            layout.source_root().join("legal/terms.html"),
            "<h1>Terms</h1>",
        )
        .unwrap();
        fs::write(layout.source_root().join("index.hbs"), "{{title}}").unwrap();

        let report = copy_static_html(&layout).unwrap();
        assert_eq!(report.written, 2);
        assert!(layout.output_root().join("404.html").exists());
        assert!(layout.output_root().join("legal/terms.html").exists());
        assert!(!layout.output_root().join("index.hbs").exists());
    }

    #[test]
    fn missing_directories_are_empty_work() {
        let (_dir, layout) = fixture();
        assert_eq!(copy_fonts(&layout).unwrap(), TaskReport::default());
        assert_eq!(copy_plain_css(&layout).unwrap(), TaskReport::default());
    }
}
