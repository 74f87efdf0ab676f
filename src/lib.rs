//! This crate contains the typesetting core of SpanDeX: TeX font metrics and the TeX paragraph
//! builder.
//!
//! Fonts are read from TeX font metric files by the [`fonts`] module, and paragraphs made of
//! characters, glue, penalties and friends are broken into lines by [`layout::paragraphs`],
//! with exactly the same decisions TeX would make.

#![warn(missing_docs)]

#[macro_use]
extern crate log;

pub mod config;
pub mod fonts;
pub mod layout;
pub mod units;

use std::path::PathBuf;
use std::{error, fmt, io, result};

use crate::fonts::errors::FontError;

macro_rules! impl_from_error {
    ($type: ty, $variant: path, $from: ty) => {
        impl From<$from> for $type {
            fn from(e: $from) -> $type {
                $variant(e)
            }
        }
    };
}

/// The error type of the library.
#[derive(Debug)]
pub enum Error {
    /// A font metric file was rejected.
    MalformedFont(FontError),

    /// The specified font was not found.
    FontNotFound(PathBuf),

    /// The font parameter name is unknown.
    UnknownFontParam(String),

    /// A dimension or a glue specification could not be parsed.
    InvalidDimension(String),

    /// The configuration file could not be parsed.
    TomlError(toml::de::Error),

    /// The hyphenation patterns could not be loaded.
    HyphenationError(spandex_hyphenation::load::Error),

    /// The paragraph could not be broken into lines.
    LineBreaking(String),

    /// Another io error occured.
    IoError(io::Error),
}

impl_from_error!(Error, Error::MalformedFont, FontError);
impl_from_error!(Error, Error::TomlError, toml::de::Error);
impl_from_error!(Error, Error::HyphenationError, spandex_hyphenation::load::Error);
impl_from_error!(Error, Error::IoError, io::Error);

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedFont(e) => write!(fmt, "bad font metric file: {}", e),
            Error::FontNotFound(path) => write!(fmt, "couldn't find font \"{}\"", path.display()),
            Error::UnknownFontParam(name) => write!(fmt, "unknown font parameter \"{}\"", name),
            Error::InvalidDimension(s) => write!(fmt, "invalid dimension \"{}\"", s),
            Error::TomlError(e) => write!(fmt, "bad configuration: {}", e),
            Error::HyphenationError(e) => write!(fmt, "couldn't load hyphenation patterns: {}", e),
            Error::LineBreaking(e) => write!(fmt, "couldn't break paragraph: {}", e),
            Error::IoError(e) => write!(fmt, "an io error occured: {}", e),
        }
    }
}

impl error::Error for Error {}

/// The result type of the library.
pub type Result<T> = result::Result<T, Error>;
