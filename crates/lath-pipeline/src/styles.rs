//! Sass compilation and vendor prefixing.

use std::fs;
use std::path::Path;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::config::SiteLayout;
use crate::task::{PipelineError, TaskReport};
use crate::walk;

/// Compile every top-level sheet in the scss directory into minified,
/// vendor-prefixed css.
///
/// Underscore-prefixed partials are pulled in by the sheets that import
/// them and are never compiled on their own.
pub fn compile_styles(layout: &SiteLayout) -> Result<TaskReport, PipelineError> {
    let scss_dir = layout.scss_dir();
    let sheets: Vec<_> = walk::files_with_extension(&scss_dir, "scss", false)
        .into_iter()
        .filter(|file| {
            let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            !stem.starts_with('_')
        })
        .collect();
    if sheets.is_empty() {
        return Ok(TaskReport::default());
    }

    let dest = layout.out_css_dir();
    fs::create_dir_all(&dest).map_err(|e| PipelineError::write(&dest, e))?;

    let mut written = 0;
    for file in sheets {
        let options = grass::Options::default()
            .style(grass::OutputStyle::Compressed)
            .load_path(&scss_dir);
        let css = grass::from_path(&file, &options).map_err(|e| PipelineError::StyleError {
            path: file.display().to_string(),
            message: e.to_string(),
        })?;
        let prefixed = prefix_css(&css, &file)?;

        let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("main");
        let out = dest.join(format!("{stem}.css"));
        fs::write(&out, prefixed).map_err(|e| PipelineError::write(&out, e))?;
        written += 1;
    }

    Ok(TaskReport { written, skipped: 0 })
}

/// Run compiled css through the prefixer, minifying on the way out.
fn prefix_css(css: &str, path: &Path) -> Result<String, PipelineError> {
    let stylesheet =
        StyleSheet::parse(css, ParserOptions::default()).map_err(|e| PipelineError::StyleError {
            path: path.display().to_string(),
            message: format!("CSS parse error: {}", e),
        })?;

    let targets = Targets {
        browsers: Some(browser_floor()),
        ..Targets::default()
    };
    let out = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..Default::default()
        })
        .map_err(|e| PipelineError::StyleError {
            path: path.display().to_string(),
            message: format!("CSS print error: {}", e),
        })?;

    Ok(out.code)
}

/// Oldest browser versions still catered to, encoded the way the prefixer
/// expects: `major << 16 | minor << 8`.
fn browser_floor() -> Browsers {
    Browsers {
        chrome: Some(60 << 16),
        edge: Some(15 << 16),
        firefox: Some(55 << 16),
        ios_saf: Some(10 << 16),
        safari: Some(10 << 16),
        ..Default::default()
    }
}
