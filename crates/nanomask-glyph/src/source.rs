use std::collections::HashMap;

use crate::error::GlyphError;
use crate::outline::GlyphOutline;

/// Something that can hand out raw glyph outlines by character.
pub trait OutlineSource {
    /// Identifies the font in a [`GlyphCache`](crate::GlyphCache). Different
    /// fonts must report different keys.
    fn font_key(&self) -> &str;

    fn outline(&self, ch: char) -> Result<GlyphOutline, GlyphError>;
}

/// Outlines held in memory, e.g. built programmatically.
#[derive(Clone, Debug, Default)]
pub struct InMemoryOutlines {
    key: String,
    glyphs: HashMap<char, GlyphOutline>,
}

impl InMemoryOutlines {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            glyphs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, ch: char, outline: GlyphOutline) -> Option<GlyphOutline> {
        self.glyphs.insert(ch, outline)
    }

    pub fn with_glyph(mut self, ch: char, outline: GlyphOutline) -> Self {
        self.insert(ch, outline);
        self
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl OutlineSource for InMemoryOutlines {
    fn font_key(&self) -> &str {
        &self.key
    }

    fn outline(&self, ch: char) -> Result<GlyphOutline, GlyphError> {
        self.glyphs
            .get(&ch)
            .cloned()
            .ok_or_else(|| GlyphError::MissingGlyph {
                font: self.key.clone(),
                ch,
            })
    }
}
