//! Encoding of font metric files.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::fonts::fixword::FixWord;
use crate::fonts::reader::RawMetrics;
use crate::Result;

fn push_fix_words(bytes: &mut Vec<u8>, table: &[FixWord]) {
    for value in table {
        bytes.extend_from_slice(&value.to_raw().to_be_bytes());
    }
}

impl RawMetrics {
    /// Encodes the metrics in the binary format.
    ///
    /// The subfile sizes are recomputed from the tables, and the header words are written as
    /// they are, so decoding a file and encoding it again gives back the same bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let lengths = self.lengths();
        let mut bytes = Vec::with_capacity(lengths.lf as usize * 4);

        for size in lengths.to_array().iter() {
            bytes.extend_from_slice(&size.to_be_bytes());
        }

        for word in &self.header_words {
            bytes.extend_from_slice(&word.to_be_bytes());
        }

        for info in &self.char_infos {
            bytes.extend_from_slice(&info.to_bytes());
        }

        push_fix_words(&mut bytes, &self.widths);
        push_fix_words(&mut bytes, &self.heights);
        push_fix_words(&mut bytes, &self.depths);
        push_fix_words(&mut bytes, &self.italics);

        for instruction in &self.lig_kern {
            bytes.extend_from_slice(&instruction.to_bytes());
        }

        push_fix_words(&mut bytes, &self.kerns);

        for recipe in &self.extensibles {
            bytes.extend_from_slice(&[recipe.top, recipe.mid, recipe.bot, recipe.rep]);
        }

        push_fix_words(&mut bytes, &self.params);

        bytes
    }

    /// Writes the metrics to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(&self.to_bytes())?;
        Ok(())
    }
}
