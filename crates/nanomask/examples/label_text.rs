//! Decode a text label from a font file and summarise its outline.
//!
//! Usage: `label_text <font.ttf> [text] [height]`.

use std::env;

use log::{info, LevelFilter};
use nanomask::glyph::{CubicSpline, FontFile, FontParams, DEFAULT_TEXT_HEIGHT};
use nanomask::{layout_text, GlyphCache};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    nanomask::init_logging(LevelFilter::Info)?;

    let mut args = env::args().skip(1);
    let Some(font_path) = args.next() else {
        eprintln!("Usage: label_text <font.ttf> [text] [height]");
        return Ok(());
    };
    let text = args.next().unwrap_or_else(|| "A1".to_string());
    let height = match args.next() {
        Some(h) => h.parse()?,
        None => DEFAULT_TEXT_HEIGHT,
    };

    let font = FontFile::open(&font_path, FontParams::default())?;
    let mut cache = GlyphCache::lru(128);
    let run = layout_text(&mut cache, &font, &text, height)?;

    for placed in &run.glyphs {
        let contours = placed.contours();
        let control_points: usize = contours
            .iter()
            .map(|c| CubicSpline::from_contour(c).control_points.len())
            .sum();
        info!(
            "{:?} at x={:.3}: {} contour(s), {} spline control point(s)",
            placed.ch,
            placed.origin.x,
            contours.len(),
            control_points
        );
    }
    info!(
        "label {text:?} is {:.3} wide; cache {:?}",
        run.width,
        cache.stats()
    );
    Ok(())
}
