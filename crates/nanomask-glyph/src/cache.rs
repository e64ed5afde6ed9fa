//! Caller-owned memoisation of decoded glyphs.
//!
//! The cache has no interior mutability; share it across threads by
//! wrapping it in a `Mutex`.

use std::collections::HashMap;
use std::sync::Arc;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::decode::{decode_outline, DecodedGlyph};
use crate::error::GlyphError;
use crate::source::OutlineSource;

/// How many decoded glyphs a [`GlyphCache`] keeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvictionPolicy {
    #[default]
    Unbounded,
    /// Keep at most `capacity` glyphs, dropping the least recently used.
    /// A capacity of zero disables caching.
    Lru { capacity: usize },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug)]
struct Entry {
    glyph: Arc<DecodedGlyph>,
    last_used: u64,
}

#[derive(Debug, Default)]
pub struct GlyphCache {
    policy: EvictionPolicy,
    entries: HashMap<(String, char), Entry>,
    tick: u64,
    stats: CacheStats,
}

impl GlyphCache {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn lru(capacity: usize) -> Self {
        Self::new(EvictionPolicy::Lru { capacity })
    }

    #[inline]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, font_key: &str, ch: char) -> bool {
        self.entries.contains_key(&(font_key.to_owned(), ch))
    }

    /// Return the decoded glyph for `ch`, decoding it from `source` on a miss.
    /// Failed decodes are not cached.
    pub fn get_or_decode<S>(&mut self, source: &S, ch: char) -> Result<Arc<DecodedGlyph>, GlyphError>
    where
        S: OutlineSource + ?Sized,
    {
        self.tick += 1;
        let key = (source.font_key().to_owned(), ch);
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_used = self.tick;
            self.stats.hits += 1;
            return Ok(Arc::clone(&entry.glyph));
        }

        self.stats.misses += 1;
        let glyph = Arc::new(decode_outline(&source.outline(ch)?)?);
        trace!("glyph cache miss for {ch:?} in {}", key.0);

        if let EvictionPolicy::Lru { capacity } = self.policy {
            if capacity == 0 {
                return Ok(glyph);
            }
            while self.entries.len() >= capacity {
                self.evict_oldest();
            }
        }
        self.entries.insert(
            key,
            Entry {
                glyph: Arc::clone(&glyph),
                last_used: self.tick,
            },
        );
        Ok(glyph)
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.stats.evictions += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{GlyphOutline, PointKind};
    use crate::source::InMemoryOutlines;
    use nalgebra::Point2;

    fn bar(width: f64) -> GlyphOutline {
        GlyphOutline::default()
            .with_contour(&[
                (Point2::new(0.0, 0.0), PointKind::OnCurve),
                (Point2::new(width, 0.0), PointKind::OnCurve),
                (Point2::new(width, 1.0), PointKind::OnCurve),
                (Point2::new(0.0, 1.0), PointKind::OnCurve),
            ])
            .with_advance(width)
    }

    fn font() -> InMemoryOutlines {
        InMemoryOutlines::new("bars")
            .with_glyph('a', bar(0.5))
            .with_glyph('b', bar(0.6))
            .with_glyph('c', bar(0.7))
    }

    #[test]
    fn repeated_lookups_hit() {
        let font = font();
        let mut cache = GlyphCache::default();
        let first = cache.get_or_decode(&font, 'a').expect("decode");
        let second = cache.get_or_decode(&font, 'a').expect("decode");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                evictions: 0
            }
        );
    }

    #[test]
    fn lru_drops_least_recently_used() {
        let font = font();
        let mut cache = GlyphCache::lru(2);
        cache.get_or_decode(&font, 'a').expect("a");
        cache.get_or_decode(&font, 'b').expect("b");
        cache.get_or_decode(&font, 'a').expect("a again");
        cache.get_or_decode(&font, 'c').expect("c");

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("bars", 'a'));
        assert!(!cache.contains("bars", 'b'));
        assert!(cache.contains("bars", 'c'));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn policy_reads_from_json() {
        let policy: EvictionPolicy =
            serde_json::from_str(r#"{ "kind": "lru", "capacity": 4 }"#).expect("parse");
        assert_eq!(policy, EvictionPolicy::Lru { capacity: 4 });
        let policy: EvictionPolicy =
            serde_json::from_str(r#"{ "kind": "unbounded" }"#).expect("parse");
        assert_eq!(GlyphCache::new(policy).policy(), EvictionPolicy::Unbounded);
    }

    #[test]
    fn zero_capacity_never_stores() {
        let font = font();
        let mut cache = GlyphCache::lru(0);
        cache.get_or_decode(&font, 'a').expect("a");
        cache.get_or_decode(&font, 'a').expect("a");
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn failures_are_not_cached_and_fonts_do_not_collide() {
        let font = font();
        let other = InMemoryOutlines::new("wide").with_glyph('a', bar(2.0));
        let mut cache = GlyphCache::default();

        assert!(matches!(
            cache.get_or_decode(&font, 'z'),
            Err(GlyphError::MissingGlyph { ch: 'z', .. })
        ));
        assert!(cache.is_empty());

        let narrow = cache.get_or_decode(&font, 'a').expect("narrow");
        let wide = cache.get_or_decode(&other, 'a').expect("wide");
        assert_eq!(narrow.advance, 0.5);
        assert_eq!(wide.advance, 2.0);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
