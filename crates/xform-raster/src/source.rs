//! Abstract page source.
//!
//! The pipeline only needs a handful of capabilities from a document
//! back end: a page count, page sizes, and device-resolution pixels for a
//! page. Both the PDF and JPEG front ends implement this trait; tests drive
//! the pipeline with synthetic sources.

use crate::error::Result;
use crate::header::ColorType;

/// Rendering parameters handed to a source per page.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub xdpi: u32,
    pub ydpi: u32,
    /// Full raster extent in pixels, for sources that scale to the page.
    pub width: u32,
    pub height: u32,
    pub color_type: ColorType,
}

/// A page rendered at device resolution.
///
/// Grayscale pages carry one byte per pixel, color pages four (RGBX, the
/// X byte is discarded when the scanline is packed for the wire).
#[derive(Debug, Clone)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel: 1 (gray) or 4 (RGBX).
    pub bpp: u32,
    pub pixels: Vec<u8>,
}

impl PageImage {
    pub fn new_gray(width: u32, height: u32, pixels: Vec<u8>) -> PageImage {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        PageImage {
            width,
            height,
            bpp: 1,
            pixels,
        }
    }

    pub fn new_rgbx(width: u32, height: u32, pixels: Vec<u8>) -> PageImage {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        PageImage {
            width,
            height,
            bpp: 4,
            pixels,
        }
    }

    /// One row of pixels.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = (self.width * self.bpp) as usize;
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }
}

/// Document back end capability.
pub trait PageSource {
    /// Number of printable pages in the document.
    fn page_count(&self) -> u32;

    /// Page size in printer points.
    fn page_size(&self, index: u32) -> (f64, f64);

    /// Whether the document carries color content.
    fn is_color(&self) -> bool;

    /// Render page `index` (0-based) at device resolution.
    fn render_page(&mut self, index: u32, options: &RenderOptions) -> Result<PageImage>;
}
