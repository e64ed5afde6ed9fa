//! Outline source backed by a TrueType/OpenType font file.
//!
//! Outlines are captured from `ttf-parser` into tagged points and
//! normalised so that one unit is the font's line height (or em size).

use std::fs;
use std::path::Path;

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use ttf_parser::{Face, OutlineBuilder};

use crate::error::GlyphError;
use crate::outline::{GlyphOutline, PointKind};
use crate::source::OutlineSource;

/// Font metric that outline coordinates are divided by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontNormalization {
    /// Ascender − descender + line gap.
    #[default]
    LineHeight,
    UnitsPerEm,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontParams {
    #[serde(default)]
    pub normalization: FontNormalization,
    /// Face index inside a font collection.
    #[serde(default)]
    pub face_index: u32,
}

/// A loaded font. The raw bytes are kept and re-parsed per lookup, which only
/// reads table headers.
#[derive(Clone, Debug)]
pub struct FontFile {
    name: String,
    key: String,
    data: Vec<u8>,
    params: FontParams,
    scale: f64,
}

impl FontFile {
    /// Read and validate a font file, named by its path.
    pub fn open(path: impl AsRef<Path>, params: FontParams) -> Result<Self, GlyphError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        Self::from_bytes(path.display().to_string(), data, params)
    }

    /// Parse font bytes under `name`.
    ///
    /// The cache key combines the name with the face index and normalisation,
    /// so one file opened with different params never shares cached glyphs.
    pub fn from_bytes(
        name: impl Into<String>,
        data: Vec<u8>,
        params: FontParams,
    ) -> Result<Self, GlyphError> {
        let name = name.into();
        let face = parse_face(&name, &data, params.face_index)?;
        let (metric, units) = match params.normalization {
            FontNormalization::LineHeight => ("line height", f64::from(face.height())),
            FontNormalization::UnitsPerEm => ("units per em", f64::from(face.units_per_em())),
        };
        if units <= 0.0 {
            return Err(GlyphError::InvalidFontMetrics { font: name, metric });
        }
        debug!(
            "loaded font {name}: {} glyph(s), {metric} = {units}",
            face.number_of_glyphs()
        );
        let key = format!(
            "{name}#{}:{:?}",
            params.face_index, params.normalization
        );
        Ok(Self {
            scale: 1.0 / units,
            name,
            key,
            data,
            params,
        })
    }

    /// Path or caller-supplied name used in error messages.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn params(&self) -> &FontParams {
        &self.params
    }

    /// Factor from font units to normalised units.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn face(&self) -> Result<Face<'_>, GlyphError> {
        parse_face(&self.name, &self.data, self.params.face_index)
    }
}

fn parse_face<'a>(name: &str, data: &'a [u8], index: u32) -> Result<Face<'a>, GlyphError> {
    Face::parse(data, index).map_err(|e| GlyphError::FontParse {
        font: name.to_owned(),
        reason: e.to_string(),
    })
}

impl OutlineSource for FontFile {
    fn font_key(&self) -> &str {
        &self.key
    }

    fn outline(&self, ch: char) -> Result<GlyphOutline, GlyphError> {
        let face = self.face()?;
        let id = face.glyph_index(ch).ok_or_else(|| GlyphError::MissingGlyph {
            font: self.name.clone(),
            ch,
        })?;
        let mut capture = TaggedCapture::new(self.scale);
        let outlined = face.outline_glyph(id, &mut capture).is_some();
        let advance = face.glyph_hor_advance(id).map_or(0.0, f64::from) * self.scale;
        capture
            .into_outline(outlined, advance)
            .ok_or_else(|| GlyphError::FontParse {
                font: self.name.clone(),
                reason: format!("glyph for {ch:?} has a malformed outline"),
            })
    }
}

/// Records builder callbacks as tagged points.
struct TaggedCapture {
    scale: f64,
    points: Vec<Point2<f64>>,
    tags: Vec<u8>,
    contour_ends: Vec<usize>,
    contour_start: usize,
}

impl TaggedCapture {
    fn new(scale: f64) -> Self {
        Self {
            scale,
            points: Vec::new(),
            tags: Vec::new(),
            contour_ends: Vec::new(),
            contour_start: 0,
        }
    }

    fn push(&mut self, x: f32, y: f32, kind: PointKind) {
        self.points
            .push(Point2::new(f64::from(x) * self.scale, f64::from(y) * self.scale));
        self.tags.push(kind.tag());
    }

    fn end_contour(&mut self) {
        let len = self.points.len() - self.contour_start;
        if len == 0 {
            return;
        }
        // Tagged contours close implicitly; drop an explicit return to the start.
        let last = self.points.len() - 1;
        if len > 1
            && PointKind::from_tag(self.tags[last]).is_on_curve()
            && self.points[last] == self.points[self.contour_start]
        {
            self.points.pop();
            self.tags.pop();
        }
        self.contour_ends.push(self.points.len() - 1);
        self.contour_start = self.points.len();
    }

    fn finish(mut self, advance: f64) -> GlyphOutline {
        self.end_contour();
        GlyphOutline::new(self.points, self.tags, self.contour_ends, advance)
    }

    /// Outline for a finished `outline_glyph` call.
    ///
    /// The parser reports `None` both for glyphs without an outline (a space
    /// keeps its advance) and for outlines it gave up on midway. Only the
    /// first may have emitted no points.
    fn into_outline(self, outlined: bool, advance: f64) -> Option<GlyphOutline> {
        if !outlined && !self.points.is_empty() {
            return None;
        }
        Some(self.finish(advance))
    }
}

impl OutlineBuilder for TaggedCapture {
    fn move_to(&mut self, x: f32, y: f32) {
        self.end_contour();
        self.push(x, y, PointKind::OnCurve);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(x, y, PointKind::OnCurve);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.push(x1, y1, PointKind::Quadratic);
        self.push(x, y, PointKind::OnCurve);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.push(x1, y1, PointKind::Cubic);
        self.push(x2, y2, PointKind::Cubic);
        self.push(x, y, PointKind::OnCurve);
    }

    fn close(&mut self) {
        self.end_contour();
    }
}
