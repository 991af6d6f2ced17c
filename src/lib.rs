//! # Caption Press
//!
//! Puts top and bottom captions on an image, sizing each caption to the
//! largest font that fits, then saves the result or mails it as an
//! attachment.
//!
//! # Pipeline
//!
//! ```text
//! 1. Load      file      →  SourceImage       (decode + normalize into the band)
//! 2. Compose   source    →  CompositedImage   (fit, center, draw Top then Bottom)
//! 3. Deliver   composite →  file | mail       (encode PNG / JPEG / TIFF / BMP)
//! ```
//!
//! A [`session::Session`] owns the current source, the style choices, and the
//! last composite. Every user action is one method on it, guarded by a
//! validation gate that rejects the action before anything changes.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | User actions, validation gates, state replacement rules |
//! | [`text`] | Font-fit solver and caption compositor behind the [`text::TextEngine`] trait |
//! | [`imaging`] | Decode, normalize into the resolution band, encode, save |
//! | [`style`] | Caption slots, text color, font palette and font references |
//! | [`delivery`] | Mail message construction and SMTP sending with `lettre` |
//! | [`config`] | `caption-press.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup for `-v` |
//!
//! # Design Decisions
//!
//! ## Linear Font Search
//!
//! [`text::solve_font_size`] starts at the maximum size and steps down one
//! unit at a time until the measured text fits. The first fitting size is the
//! largest integral one, so results are stable and easy to test against a
//! mock engine with fixed metrics.
//!
//! ## Glyph Backend Behind a Trait
//!
//! Fitting and compositing only talk to [`text::TextEngine`]. The production
//! engine wraps `rusttype`; tests use a recording mock and assert on the exact
//! sequence of loads, measures and draws.
//!
//! ## Two-Case Normalization
//!
//! Oversized images shrink into the max box, undersized images grow to cover
//! the min box without leaving the outer box. Aspect ratio is always kept.
//! See [`imaging::plan_resize`].
//!
//! ## No Secrets in Config
//!
//! The SMTP password is read from the environment variable named by
//! `mail.password_env`. The config file only holds the host, login and sender.

pub mod config;
pub mod delivery;
pub mod imaging;
pub mod logging;
pub mod output;
pub mod session;
pub mod style;
pub mod text;

#[cfg(test)]
pub(crate) mod test_helpers;
