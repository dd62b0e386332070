pub mod raster;
pub mod svg;

use std::path::Path;
use thiserror::Error;

/// Errors raised while rendering or writing the output artifact. All of
/// them are terminal for the request: no partial artifact is valid.
#[derive(Debug, Error)]
pub enum Error {
    #[error("render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse the generated SVG for rasterization")]
    SvgParse,

    #[error("failed to allocate a pixmap for raster rendering")]
    PixmapAlloc,

    #[error("failed to encode PNG")]
    PngEncode,
}

/// Output artifact format: vector document or raster image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    /// Infer the format from the output file extension; anything that is
    /// not `.png` falls back to SVG.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension() {
            Some(ext) if ext.eq_ignore_ascii_case("png") => Self::Png,
            _ => Self::Svg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_inferred_from_the_extension() {
        assert_eq!(OutputFormat::from_path("diagram.png"), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path("diagram.PNG"), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path("diagram.svg"), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_path("diagram"), OutputFormat::Svg);
    }
}
