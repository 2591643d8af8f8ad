//! Image optimization with newer-file gating.
//!
//! Only sources newer than their output copy are touched, so repeated
//! builds skip the expensive encoders entirely. Watch mode seeds the
//! output with plain copies first and optimizes on change.

use std::borrow::Cow;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;

use crate::config::SiteLayout;
use crate::task::{PipelineError, TaskReport};
use crate::walk;

/// Per-format optimizer settings.
#[derive(Debug, Clone)]
pub struct ImageOptions {
    /// Re-encode single-frame GIFs with interlaced rows.
    pub gif_interlace: bool,
    /// Re-encode JPEGs with progressive scans.
    pub jpeg_progressive: bool,
    pub jpeg_quality: u8,
    /// Preset handed to the PNG optimizer.
    pub png_level: u8,
    pub svg: SvgOptions,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            gif_interlace: true,
            jpeg_progressive: true,
            jpeg_quality: 85,
            png_level: 5,
            svg: SvgOptions::default(),
        }
    }
}

/// Settings for the SVG cleanup pass.
#[derive(Debug, Clone)]
pub struct SvgOptions {
    /// Strip the `viewBox` attribute from the root element. Off by
    /// default; responsive sizing needs the viewBox.
    pub remove_view_box: bool,
    /// Dissolve `<g>` wrappers that carry no attributes.
    pub collapse_groups: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            remove_view_box: false,
            collapse_groups: true,
        }
    }
}

/// Optimize every image newer than its output copy.
pub fn optimize_images(
    layout: &SiteLayout,
    options: &ImageOptions,
) -> Result<TaskReport, PipelineError> {
    let img_dir = layout.img_dir();
    let dest_root = layout.out_img_dir();
    let files = walk::all_files(&img_dir, true);

    let results: Vec<Result<bool, PipelineError>> = files
        .par_iter()
        .map(|file| {
            let rel = file.strip_prefix(&img_dir).unwrap_or(file);
            let dest = dest_root.join(rel);
            if !is_newer(file, &dest)? {
                return Ok(false);
            }
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| PipelineError::write(parent, e))?;
            }
            optimize_file(file, &dest, options)?;
            Ok(true)
        })
        .collect();

    let mut report = TaskReport::default();
    for result in results {
        if result? {
            report.written += 1;
        } else {
            report.skipped += 1;
        }
    }
    Ok(report)
}

/// Copy images newer than their output copy without optimizing. Watch
/// mode uses this for its initial pass so startup stays fast.
pub fn move_images(layout: &SiteLayout) -> Result<TaskReport, PipelineError> {
    let img_dir = layout.img_dir();
    let dest_root = layout.out_img_dir();
    let mut report = TaskReport::default();

    for file in walk::all_files(&img_dir, true) {
        let rel = file.strip_prefix(&img_dir).unwrap_or(&file);
        let dest = dest_root.join(rel);
        if !is_newer(&file, &dest)? {
            report.skipped += 1;
            continue;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::write(parent, e))?;
        }
        fs::copy(&file, &dest).map_err(|e| PipelineError::write(&dest, e))?;
        report.written += 1;
    }
    Ok(report)
}

/// A source is due for processing when its output copy is missing or
/// older than the source.
pub fn is_newer(source: &Path, dest: &Path) -> Result<bool, PipelineError> {
    let Ok(dest_meta) = fs::metadata(dest) else {
        return Ok(true);
    };
    let source_modified = fs::metadata(source)
        .and_then(|m| m.modified())
        .map_err(|e| PipelineError::read(source, e))?;
    let dest_modified = dest_meta
        .modified()
        .map_err(|e| PipelineError::read(dest, e))?;
    Ok(source_modified > dest_modified)
}

fn optimize_file(source: &Path, dest: &Path, options: &ImageOptions) -> Result<(), PipelineError> {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "gif" => optimize_gif(source, dest, options),
        "jpg" | "jpeg" => optimize_jpeg(source, dest, options),
        "png" => optimize_png(source, dest, options),
        "svg" => optimize_svg(source, dest, options),
        _ => plain_copy(source, dest),
    }
}

fn plain_copy(source: &Path, dest: &Path) -> Result<(), PipelineError> {
    fs::copy(source, dest).map_err(|e| PipelineError::write(dest, e))?;
    Ok(())
}

fn optimize_gif(source: &Path, dest: &Path, options: &ImageOptions) -> Result<(), PipelineError> {
    if !options.gif_interlace {
        return plain_copy(source, dest);
    }
    let input = fs::read(source).map_err(|e| PipelineError::read(source, e))?;

    let mut decode_options = gif::DecodeOptions::new();
    decode_options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = decode_options
        .read_info(Cursor::new(input.as_slice()))
        .map_err(|e| PipelineError::image(source, e))?;
    let width = decoder.width();
    let height = decoder.height();
    let global_palette = decoder.global_palette().map(<[u8]>::to_vec).unwrap_or_default();

    let mut frames = Vec::new();
    while let Some(frame) = decoder
        .read_next_frame()
        .map_err(|e| PipelineError::image(source, e))?
    {
        frames.push(frame.clone());
    }

    // Interlacing an animation would re-encode every frame for no gain.
    if frames.len() != 1 {
        return plain_copy(source, dest);
    }
    let mut frame = frames.remove(0);
    let frame_len = frame.width as usize * frame.height as usize;
    if frame.interlaced || frame.buffer.len() != frame_len {
        return plain_copy(source, dest);
    }

    frame.buffer = Cow::Owned(interlace_rows(
        &frame.buffer,
        frame.width as usize,
        frame.height as usize,
    ));
    frame.interlaced = true;

    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, width, height, &global_palette)
            .map_err(|e| PipelineError::image(source, e))?;
        encoder
            .write_frame(&frame)
            .map_err(|e| PipelineError::image(source, e))?;
    }
    fs::write(dest, out).map_err(|e| PipelineError::write(dest, e))
}

/// Reorder rows into the four GIF interlace passes: every 8th row from 0,
/// every 8th from 4, every 4th from 2, then the odd rows.
fn interlace_rows(buffer: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(buffer.len());
    for (start, step) in [(0, 8), (4, 8), (2, 4), (1, 2)] {
        let mut row = start;
        while row < height {
            out.extend_from_slice(&buffer[row * width..(row + 1) * width]);
            row += step;
        }
    }
    out
}

fn optimize_jpeg(source: &Path, dest: &Path, options: &ImageOptions) -> Result<(), PipelineError> {
    if !options.jpeg_progressive {
        return plain_copy(source, dest);
    }
    let decoded = image::open(source)
        .map_err(|e| PipelineError::image(source, e))?
        .to_rgb8();
    let (width, height) = decoded.dimensions();
    // The encoder addresses dimensions as u16.
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        return plain_copy(source, dest);
    }

    let mut out = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut out, options.jpeg_quality);
    encoder.set_progressive(true);
    encoder
        .encode(
            decoded.as_raw(),
            width as u16,
            height as u16,
            jpeg_encoder::ColorType::Rgb,
        )
        .map_err(|e| PipelineError::image(source, e))?;
    fs::write(dest, out).map_err(|e| PipelineError::write(dest, e))
}

fn optimize_png(source: &Path, dest: &Path, options: &ImageOptions) -> Result<(), PipelineError> {
    let data = fs::read(source).map_err(|e| PipelineError::read(source, e))?;
    let optimized = oxipng::optimize_from_memory(&data, &oxipng::Options::from_preset(options.png_level))
        .map_err(|e| PipelineError::image(source, e))?;
    fs::write(dest, optimized).map_err(|e| PipelineError::write(dest, e))
}

fn optimize_svg(source: &Path, dest: &Path, options: &ImageOptions) -> Result<(), PipelineError> {
    let raw = fs::read_to_string(source).map_err(|e| PipelineError::read(source, e))?;
    let slim = minify_svg(&raw, &options.svg);
    fs::write(dest, slim).map_err(|e| PipelineError::write(dest, e))
}

static XML_PROLOG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\?xml[^>]*\?>").expect("Invalid prolog regex"));

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Invalid comment regex"));

static BETWEEN_TAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("Invalid whitespace regex"));

static VIEW_BOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+viewBox="[^"]*""#).expect("Invalid viewBox regex"));

/// Light-touch SVG cleanup: drop the XML prolog, comments, and whitespace
/// between tags. The viewBox stays unless explicitly asked to go.
pub fn minify_svg(svg: &str, options: &SvgOptions) -> String {
    let mut out = XML_PROLOG_RE.replace_all(svg, "").into_owned();
    out = COMMENT_RE.replace_all(&out, "").into_owned();
    if options.collapse_groups {
        out = collapse_plain_groups(&out);
    }
    if options.remove_view_box {
        out = VIEW_BOX_RE.replace_all(&out, "").into_owned();
    }
    out = BETWEEN_TAGS_RE.replace_all(&out, "><").into_owned();
    out.trim().to_string()
}

/// Drop `<g>` wrappers that carry no attributes, keeping open and close
/// tags paired even when groups nest.
fn collapse_plain_groups(svg: &str) -> String {
    let mut out = String::with_capacity(svg.len());
    let mut plain_stack: Vec<bool> = Vec::new();
    let mut rest = svg;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tag_start = &rest[start..];
        let Some(close) = tag_start.find('>') else {
            out.push_str(tag_start);
            return out;
        };
        let tag = &tag_start[..=close];
        rest = &tag_start[close + 1..];

        if is_group_open(tag) {
            let inner = &tag[2..tag.len() - 1];
            if inner.trim_end().ends_with('/') {
                // Keep self-closing groups that carry attributes; a bare
                // one is dead weight either way.
                if !inner.trim_end().trim_end_matches('/').trim().is_empty() {
                    out.push_str(tag);
                }
            } else {
                let plain = inner.trim().is_empty();
                if !plain {
                    out.push_str(tag);
                }
                plain_stack.push(plain);
            }
        } else if is_group_close(tag) {
            if !plain_stack.pop().unwrap_or(false) {
                out.push_str(tag);
            }
        } else {
            out.push_str(tag);
        }
    }
    out.push_str(rest);
    out
}

fn is_group_open(tag: &str) -> bool {
    let Some(body) = tag.strip_prefix("<g") else {
        return false;
    };
    matches!(body.chars().next(), Some('>') | Some('/')) || body.starts_with(char::is_whitespace)
}

fn is_group_close(tag: &str) -> bool {
    tag.strip_prefix("</g")
        .is_some_and(|body| body[..body.len() - 1].trim().is_empty())
}
