//! Text measurement for fitting labels inside node ellipses.
//!
//! Measurement goes through cosmic-text so the fitted font size reflects
//! real font metrics and shaping. The FontSystem is expensive to build, so
//! one instance is shared process-wide.

use crate::layout::geometry::Size;
use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::info;
use std::sync::{Mutex, OnceLock};

/// Initial label font size in SVG user units.
pub const FONT_SIZE: f32 = 16.0;

/// Lower bound for the shrink loop; below this the label is drawn
/// truncated-looking rather than unreadable.
pub const MIN_FONT_SIZE: f32 = 9.0;

const SHRINK_STEP: f32 = 0.5;

struct TextMeasure {
    font_system: Mutex<FontSystem>,
}

impl TextMeasure {
    fn global() -> &'static TextMeasure {
        static MEASURE: OnceLock<TextMeasure> = OnceLock::new();
        MEASURE.get_or_init(|| {
            info!("Initializing FontSystem");
            TextMeasure {
                font_system: Mutex::new(FontSystem::new()),
            }
        })
    }

    fn measure(&self, text: &str, font_size: f32) -> Size {
        let mut font_system = self.font_system.lock().unwrap();

        let line_height = font_size * 1.2;
        let metrics = Metrics::new(font_size, line_height);

        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let attrs = Attrs::new().family(Family::Name("Arial"));

        // Unbounded so the text flows as a single natural line.
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;

        let layout_runs: Vec<_> = buffer.layout_runs().collect();
        if layout_runs.is_empty() {
            // No fonts available (headless environments): estimate from
            // the glyph count.
            max_width = text.len() as f32 * (font_size * 0.6);
            total_height = metrics.line_height;
        } else {
            for run in &layout_runs {
                if let Some(last) = run.glyphs.last() {
                    max_width = max_width.max(last.x + last.w);
                }
                total_height += metrics.line_height;
            }
        }

        Size::new(max_width, total_height)
    }
}

/// Measure a single line of text at the given font size.
pub fn measure_text(text: &str, font_size: f32) -> Size {
    TextMeasure::global().measure(text, font_size)
}

/// Shrink the font size stepwise until the text fits inside `max_width`,
/// stopping at [`MIN_FONT_SIZE`].
pub fn fit_font_size(text: &str, max_width: f32) -> f32 {
    let mut font_size = FONT_SIZE;
    while font_size > MIN_FONT_SIZE && measure_text(text, font_size).width > max_width {
        font_size -= SHRINK_STEP;
    }
    font_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measured_width_grows_with_text_length() {
        let short = measure_text("Hi", FONT_SIZE);
        let long = measure_text("A considerably longer label", FONT_SIZE);
        assert!(long.width > short.width);
    }

    #[test]
    fn fitted_size_stays_within_bounds() {
        let size = fit_font_size("An extremely long use case description", 40.0);
        assert!(size <= FONT_SIZE);
        assert!(size >= MIN_FONT_SIZE);
    }

    #[test]
    fn short_text_keeps_the_initial_size() {
        let size = fit_font_size("Go", 10_000.0);
        assert_eq!(size, FONT_SIZE);
    }
}
