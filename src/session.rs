//! Editing session: the current image, style choices, and the last composite.
//!
//! Every user action is a method on [`Session`]. An action first runs its
//! validation gate; when a precondition is missing it returns the matching
//! [`ValidationError`] and changes nothing. Actions that fail later (decode,
//! fitting, encoding, delivery) also leave the session as it was.
//!
//! | Action | Gate (in order) | Effect |
//! |---|---|---|
//! | [`select_image`](Session::select_image) | none | replace source, drop composite |
//! | [`compose`](Session::compose) | image, font, color | replace composite |
//! | [`save`](Session::save) | output name, image, composite, format | write `<dir>/<name>.<ext>` |
//! | [`send`](Session::send) | recipient, output name, image, composite, format | mail it |

use crate::config::AppConfig;
use crate::delivery::{DeliveryError, Mailer};
use crate::imaging::{
    self, EncodeError, EncodedImage, FormatError, LoadError, OutputFormat, Quality,
    ResolutionBand, SaveError, SourceImage,
};
use crate::style::{Caption, FontPalette, FontRef, Style, StyleError, TextColor};
use crate::text::{self, ComposeError, CompositedImage, TextEngine};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// A missing precondition. The message is what the user sees.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please select an image")]
    NoImage,
    #[error("please select a font")]
    NoFont,
    #[error("please select a color")]
    NoColor,
    #[error("please specify an output name")]
    NoOutputName,
    #[error("output name must not contain path separators")]
    InvalidOutputName,
    #[error("please enter an email address")]
    NoRecipient,
    #[error("please add text to the image first")]
    NoComposite,
    #[error("please select a format")]
    NoFormat,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Result of a successful [`Session::save`].
#[derive(Debug, Clone)]
pub struct SavedImage {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub bytes: usize,
}

/// Result of a successful [`Session::send`].
#[derive(Debug, Clone)]
pub struct SentImage {
    pub recipient: String,
    pub attachment: String,
    pub bytes: usize,
}

#[derive(Debug, Clone)]
pub struct Session {
    band: ResolutionBand,
    max_font_size: f32,
    quality: Quality,
    source: Option<SourceImage>,
    composite: Option<CompositedImage>,
    font: Option<FontRef>,
    color: Option<TextColor>,
    format: Option<OutputFormat>,
}

impl Session {
    /// Empty session: nothing selected, no format chosen.
    pub fn new(band: ResolutionBand, max_font_size: f32, quality: Quality) -> Self {
        Self {
            band,
            max_font_size,
            quality,
            source: None,
            composite: None,
            font: None,
            color: None,
            format: None,
        }
    }

    /// Session with encoder settings from config and the configured format
    /// preselected.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut session = Self::new(
            config.normalize,
            config.fit.max_font_size,
            config.output.quality(),
        );
        session.format = Some(config.output.format);
        session
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn composite(&self) -> Option<&CompositedImage> {
        self.composite.as_ref()
    }

    pub fn font(&self) -> Option<&FontRef> {
        self.font.as_ref()
    }

    pub fn color(&self) -> Option<TextColor> {
        self.color
    }

    pub fn format(&self) -> Option<OutputFormat> {
        self.format
    }

    /// The chosen font and color, once both are set.
    pub fn style(&self) -> Option<Style> {
        Some(Style {
            font: self.font.clone()?,
            color: self.color?,
        })
    }

    /// Load and normalize `path`. Replaces the source and drops any composite
    /// made from the previous one. On failure nothing changes.
    pub fn select_image(&mut self, path: &Path) -> Result<&SourceImage, SessionError> {
        let source = imaging::load(path, &self.band)?;
        self.composite = None;
        Ok(self.source.insert(source))
    }

    pub fn set_font(&mut self, font: FontRef) {
        self.font = Some(font);
    }

    pub fn set_color(&mut self, color: TextColor) {
        self.color = Some(color);
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = Some(format);
    }

    /// Resolve a palette name or font path, then select it.
    pub fn select_font(
        &mut self,
        palette: &FontPalette,
        selection: &str,
    ) -> Result<(), SessionError> {
        self.set_font(palette.resolve(selection)?);
        Ok(())
    }

    pub fn select_color(&mut self, token: &str) -> Result<(), SessionError> {
        self.set_color(token.parse()?);
        Ok(())
    }

    pub fn select_format(&mut self, token: &str) -> Result<(), SessionError> {
        self.set_format(token.parse()?);
        Ok(())
    }

    /// Draw `top` and `bottom` onto a fresh copy of the source and keep the
    /// result as the current composite.
    pub fn compose<E: TextEngine>(
        &mut self,
        engine: &E,
        top: &str,
        bottom: &str,
    ) -> Result<&CompositedImage, SessionError> {
        let source = self.source.as_ref().ok_or(ValidationError::NoImage)?;
        let font = self.font.clone().ok_or(ValidationError::NoFont)?;
        let color = self.color.ok_or(ValidationError::NoColor)?;

        let style = Style { font, color };
        let composite = text::compose(
            engine,
            source,
            &Caption::top(top),
            &Caption::bottom(bottom),
            &style,
            self.max_font_size,
        )?;
        info!(
            captions = composite.placements().len(),
            digest = %composite.digest(),
            "composite ready"
        );
        Ok(self.composite.insert(composite))
    }

    /// Write the composite to `<dir>/<output_name>.<ext>`, replacing any
    /// existing file.
    pub fn save(&self, dir: &Path, output_name: &str) -> Result<SavedImage, SessionError> {
        let name = check_output_name(output_name)?;
        let (composite, format) = self.ready_output()?;

        let path = dir.join(format.file_name(name));
        let encoded = imaging::save(composite.pixels(), &path, format, self.quality)?;
        Ok(SavedImage {
            path,
            format,
            bytes: encoded.bytes.len(),
        })
    }

    /// Encode the composite and mail it to `recipient` as
    /// `<output_name>.<ext>`.
    pub fn send<T>(
        &self,
        mailer: &Mailer<T>,
        recipient: &str,
        output_name: &str,
    ) -> Result<SentImage, SessionError>
    where
        T: lettre::Transport,
        T::Error: std::error::Error + Send + Sync + 'static,
    {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(ValidationError::NoRecipient.into());
        }
        let name = check_output_name(output_name)?;
        let encoded = self.encode()?;

        mailer.send(recipient, &encoded, name)?;
        Ok(SentImage {
            recipient: recipient.to_string(),
            attachment: encoded.format.file_name(name),
            bytes: encoded.bytes.len(),
        })
    }

    /// Encode the composite in the chosen format.
    pub fn encode(&self) -> Result<EncodedImage, SessionError> {
        let (composite, format) = self.ready_output()?;
        Ok(imaging::encode(composite.pixels(), format, self.quality)?)
    }

    fn ready_output(&self) -> Result<(&CompositedImage, OutputFormat), ValidationError> {
        if self.source.is_none() {
            return Err(ValidationError::NoImage);
        }
        let composite = self.composite.as_ref().ok_or(ValidationError::NoComposite)?;
        let format = self.format.ok_or(ValidationError::NoFormat)?;
        Ok((composite, format))
    }
}

fn check_output_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::NoOutputName);
    }
    if name.contains(['/', '\\']) {
        return Err(ValidationError::InvalidOutputName);
    }
    Ok(name)
}
