//! Finding and caching font metric files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::fonts::glyphs::GlyphTable;
use crate::fonts::{Font, FontKey};
use crate::{Error, Result};

/// This struct holds the glyph tables already loaded and knows where to look for others.
#[derive(Debug, Default)]
pub struct FontManager {
    /// The directories searched for metric files, in order.
    search_paths: Vec<PathBuf>,

    /// The hashmap that associates names of fonts with their glyph tables.
    tables: HashMap<String, Arc<GlyphTable>>,
}

impl FontManager {
    /// Creates a new font manager that searches the given directories.
    pub fn new<P: AsRef<Path>>(search_paths: &[P]) -> FontManager {
        FontManager {
            search_paths: search_paths
                .iter()
                .map(|p| p.as_ref().to_path_buf())
                .collect(),
            tables: HashMap::new(),
        }
    }

    /// Adds a directory to search after the others.
    pub fn add_search_path<P: AsRef<Path>>(&mut self, path: P) {
        self.search_paths.push(path.as_ref().to_path_buf());
    }

    /// Registers a glyph table under a name.
    pub fn insert(&mut self, name: &str, table: GlyphTable) -> Arc<GlyphTable> {
        let table = Arc::new(table);
        self.tables.insert(name.to_owned(), table.clone());
        table
    }

    /// Returns the glyph table of a font if it is already loaded.
    pub fn get(&self, name: &str) -> Option<Arc<GlyphTable>> {
        self.tables.get(name).cloned()
    }

    /// Finds the metric file of a font.
    ///
    /// The name is tried as given, then with a `.tfm` extension, in every search directory.
    pub fn find(&self, name: &str) -> Result<PathBuf> {
        let direct = Path::new(name);
        if direct.is_file() {
            return Ok(direct.to_path_buf());
        }

        let file_name = if direct.extension().is_some() {
            name.to_owned()
        } else {
            format!("{}.tfm", name)
        };

        self.search_paths
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
            .ok_or_else(|| Error::FontNotFound(PathBuf::from(name)))
    }

    /// Returns the glyph table of a font, reading it if needed.
    pub fn table(&mut self, name: &str) -> Result<Arc<GlyphTable>> {
        if let Some(table) = self.get(name) {
            return Ok(table);
        }

        let path = self.find(name)?;
        debug!("loading font {} from {}", name, path.display());
        let table = GlyphTable::from_path(&path)?;
        Ok(self.insert(name, table))
    }

    /// Loads a font at the size requested by a key.
    pub fn load(&mut self, key: FontKey) -> Result<Font> {
        let table = self.table(&key.name)?;
        Ok(Font::new(table, key))
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;

    use super::FontManager;
    use crate::fonts::glyphs::GlyphTable;
    use crate::fonts::tests::text_metrics;
    use crate::fonts::FontKey;
    use crate::units::Sp;
    use crate::Error;

    #[test]
    fn missing_font() {
        let mut manager = FontManager::new(&["/nonexistent"]);
        match manager.load(FontKey::new("cmr10")) {
            Err(Error::FontNotFound(path)) => assert_eq!(path.to_str(), Some("cmr10")),
            other => panic!("unexpected result {:?}", other.map(|f| f.key().clone())),
        }
    }

    #[test]
    fn registered_tables_are_shared() {
        let mut manager = FontManager::default();
        manager.insert("test", GlyphTable::from_raw(text_metrics()).unwrap());

        let small = manager.load(FontKey::new("test")).unwrap();
        let big = manager.load(FontKey::new("test").at(Sp::pt(20))).unwrap();
        assert_eq!(small.actual_size(), Sp::pt(10));
        assert_eq!(big.glyph(b'a').width, Sp::pt(10));
    }

    #[test]
    fn reads_from_search_path() {
        let dir = env::temp_dir().join("spandex-core-font-manager");
        fs::create_dir_all(&dir).unwrap();
        text_metrics().save(dir.join("testfont.tfm")).unwrap();

        let mut manager = FontManager::new(&[&dir]);
        let font = manager.load(FontKey::new("testfont")).unwrap();
        assert_eq!(font.glyph(b'i').width, Sp(163_840));
        assert!(manager.get("testfont").is_some());
    }
}
