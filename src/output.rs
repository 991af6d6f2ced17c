//! CLI output formatting for every command.
//!
//! Each command has a pure `format_*` function returning lines and a thin
//! `print_*` wrapper, so the text is testable without capturing stdout.
//!
//! # Output Format
//!
//! ## Compose
//!
//! ```text
//! Image cat.png
//!     Size: 1200x1200 (resized from 500x500)
//! Captions
//!     Top "HELLO" 140pt at (631, 240)
//!     Bottom "WORLD" 140pt at (622, 1091)
//! Style
//!     Font: creamy
//!     Color: White
//! Digest: 3f2a…
//! ```
//!
//! ## Save / Send
//!
//! ```text
//! Saved → out/meme.png (png, 48213 bytes)
//! Sent meme.png → friend@example.org (48213 bytes)
//! ```
//!
//! ## Fonts
//!
//! ```text
//! creamy → fonts/creamy.ttf
//! American → fonts/American.ttf (missing)
//! ```

use crate::imaging::SourceImage;
use crate::session::{SavedImage, SentImage};
use crate::style::{FontPalette, Style};
use crate::text::{CompositedImage, Placement};
use serde::Serialize;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn format_size((w, h): (u32, u32)) -> String {
    format!("{w}x{h}")
}

fn placement_line(p: &Placement) -> String {
    format!(
        "{} \"{}\" {}pt at ({:.0}, {:.0})",
        p.slot.label(),
        p.text,
        p.font_size,
        p.x,
        p.y
    )
}

/// Machine-readable compose result for `--json`.
#[derive(Debug, Serialize)]
pub struct ComposeReport<'a> {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
    pub font: String,
    pub color: String,
    pub placements: &'a [Placement],
    pub digest: String,
}

pub fn compose_report<'a>(
    source: &SourceImage,
    composite: &'a CompositedImage,
    style: &Style,
) -> ComposeReport<'a> {
    let (width, height) = composite.dimensions();
    let (original_width, original_height) = source.original_dimensions();
    ComposeReport {
        source: source.path().display().to_string(),
        width,
        height,
        original_width,
        original_height,
        font: style.font.name(),
        color: style.color.to_string(),
        placements: composite.placements(),
        digest: composite.digest(),
    }
}

pub fn format_compose_output(
    source: &SourceImage,
    composite: &CompositedImage,
    style: &Style,
) -> Vec<String> {
    let mut lines = Vec::new();
    let name = source
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| source.path().display().to_string());
    lines.push(format!("Image {name}"));
    if source.was_resized() {
        lines.push(format!(
            "{}Size: {} (resized from {})",
            indent(1),
            format_size(source.dimensions()),
            format_size(source.original_dimensions())
        ));
    } else {
        lines.push(format!("{}Size: {}", indent(1), format_size(source.dimensions())));
    }

    lines.push("Captions".to_string());
    if composite.placements().is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for p in composite.placements() {
        lines.push(format!("{}{}", indent(1), placement_line(p)));
    }

    lines.push("Style".to_string());
    lines.push(format!("{}Font: {}", indent(1), style.font.name()));
    lines.push(format!("{}Color: {}", indent(1), style.color));
    lines.push(format!("Digest: {}", composite.digest()));
    lines
}

pub fn print_compose_output(source: &SourceImage, composite: &CompositedImage, style: &Style) {
    for line in format_compose_output(source, composite, style) {
        println!("{}", line);
    }
}

pub fn format_save_output(saved: &SavedImage) -> Vec<String> {
    vec![format!(
        "Saved \u{2192} {} ({}, {} bytes)",
        saved.path.display(),
        saved.format,
        saved.bytes
    )]
}

pub fn print_save_output(saved: &SavedImage) {
    for line in format_save_output(saved) {
        println!("{}", line);
    }
}

pub fn format_send_output(sent: &SentImage) -> Vec<String> {
    vec![format!(
        "Sent {} \u{2192} {} ({} bytes)",
        sent.attachment, sent.recipient, sent.bytes
    )]
}

pub fn print_send_output(sent: &SentImage) {
    for line in format_send_output(sent) {
        println!("{}", line);
    }
}

/// One line per palette entry; files that do not exist are flagged.
pub fn format_fonts_output(palette: &FontPalette) -> Vec<String> {
    let entries = palette.entries();
    if entries.is_empty() {
        return vec!["No fonts configured (see [fonts] palette)".to_string()];
    }
    entries
        .into_iter()
        .map(|(name, font)| {
            let missing = if font.path().is_file() { "" } else { " (missing)" };
            format!("{name} \u{2192} {}{missing}", font.path().display())
        })
        .collect()
}

pub fn print_fonts_output(palette: &FontPalette) {
    for line in format_fonts_output(palette) {
        println!("{}", line);
    }
}
