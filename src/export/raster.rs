//! PNG rasterization of the rendered SVG.
//!
//! The vector document always carries a root viewBox, so the pixmap size
//! comes straight from the parsed tree scaled by the configured factor.

use crate::export::Error;
use log::debug;

/// Rasterize an SVG string into encoded PNG bytes.
pub fn svg_to_png(svg: &str, scale: f32, background: &str) -> Result<Vec<u8>, Error> {
    let mut opt = usvg::Options::default();
    // Keep output stable-ish across environments while still using system fonts.
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| Error::SvgParse)?;

    let size = tree.size();
    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;
    debug!(width = width_px, height = height_px; "Rasterizing SVG");

    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(Error::PixmapAlloc)?;

    if let Some(color) = parse_color(background) {
        pixmap.fill(color);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    pixmap.encode_png().map_err(|_| Error::PngEncode)
}

/// Named colors the configuration accepts, plus #rgb / #rrggbb hex.
fn parse_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    fn hex2(b: &[u8]) -> Option<u8> {
        let hi = (*b.first()? as char).to_digit(16)? as u8;
        let lo = (*b.get(1)? as char).to_digit(16)? as u8;
        Some((hi << 4) | lo)
    }
    fn hex1(c: u8) -> Option<u8> {
        let v = (c as char).to_digit(16)? as u8;
        Some((v << 4) | v)
    }

    let bytes = hex.as_bytes();
    match bytes.len() {
        3 => Some(tiny_skia::Color::from_rgba8(
            hex1(bytes[0])?,
            hex1(bytes[1])?,
            hex1(bytes[2])?,
            255,
        )),
        6 => Some(tiny_skia::Color::from_rgba8(
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            255,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_to_png_produces_png_signature() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10" fill="black"/></svg>"#;
        let bytes = svg_to_png(svg, 1.0, "white").unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn scale_multiplies_the_pixmap_size() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10" fill="black"/></svg>"#;
        let one = svg_to_png(svg, 1.0, "white").unwrap();
        let two = svg_to_png(svg, 2.0, "white").unwrap();
        // PNG IHDR width lives at bytes 16..20 big-endian.
        let width = |png: &[u8]| u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        assert_eq!(width(&one), 10);
        assert_eq!(width(&two), 20);
    }

    #[test]
    fn hex_backgrounds_parse() {
        assert!(parse_color("#fff").is_some());
        assert!(parse_color("#a0b1c2").is_some());
        assert!(parse_color("not-a-color").is_none());
    }
}
