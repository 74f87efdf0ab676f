//! This module contains everything needed to turn lists of glyphs and glue into lines.

pub mod constants;
pub mod glue;
pub mod paragraphs;
