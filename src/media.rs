//! Accepted image media types.
//!
//! Declared content types are checked against a closed allow-list instead of
//! inspecting the bytes. The subtype doubles as the stored file extension.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Image subtypes the vault accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMediaType {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
    Tiff,
    Avif,
    Heic,
}

#[derive(Debug, Error, PartialEq)]
pub enum MediaTypeError {
    #[error("media type '{0}' is not an image type")]
    NotAnImage(String),

    #[error("image subtype '{0}' is not supported")]
    UnsupportedSubtype(String),
}

impl ImageMediaType {
    pub const ALL: [ImageMediaType; 8] = [
        ImageMediaType::Jpeg,
        ImageMediaType::Png,
        ImageMediaType::Gif,
        ImageMediaType::Bmp,
        ImageMediaType::Webp,
        ImageMediaType::Tiff,
        ImageMediaType::Avif,
        ImageMediaType::Heic,
    ];

    /// File extension, also the record suffix.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageMediaType::Jpeg => "jpeg",
            ImageMediaType::Png => "png",
            ImageMediaType::Gif => "gif",
            ImageMediaType::Bmp => "bmp",
            ImageMediaType::Webp => "webp",
            ImageMediaType::Tiff => "tiff",
            ImageMediaType::Avif => "avif",
            ImageMediaType::Heic => "heic",
        }
    }

    /// Full `image/<subtype>` form used for Content-Type headers.
    pub fn mime(&self) -> String {
        format!("image/{}", self.extension())
    }

    /// Look up a subtype or record suffix such as `png` or `jpg`.
    pub fn from_subtype(subtype: &str) -> Result<Self, MediaTypeError> {
        match subtype.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" | "pjpeg" => Ok(ImageMediaType::Jpeg),
            "png" => Ok(ImageMediaType::Png),
            "gif" => Ok(ImageMediaType::Gif),
            "bmp" | "x-ms-bmp" => Ok(ImageMediaType::Bmp),
            "webp" => Ok(ImageMediaType::Webp),
            "tiff" => Ok(ImageMediaType::Tiff),
            "avif" => Ok(ImageMediaType::Avif),
            "heic" => Ok(ImageMediaType::Heic),
            other => Err(MediaTypeError::UnsupportedSubtype(other.to_string())),
        }
    }
}

impl FromStr for ImageMediaType {
    type Err = MediaTypeError;

    /// Parse a declared media type like `image/png; charset=binary`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or_default().trim();
        let (kind, subtype) = essence
            .split_once('/')
            .ok_or_else(|| MediaTypeError::NotAnImage(s.to_string()))?;

        if !kind.trim().eq_ignore_ascii_case("image") {
            return Err(MediaTypeError::NotAnImage(s.to_string()));
        }
        Self::from_subtype(subtype)
    }
}

impl fmt::Display for ImageMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image/{}", self.extension())
    }
}
