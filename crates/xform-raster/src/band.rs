//! Banded page buffer.
//!
//! A page is rasterized into a fixed-budget horizontal strip at a time
//! instead of as one full-page buffer. The band holds `band_height`
//! scanlines of `width` pixels at the band depth (1 byte gray, 4 bytes
//! RGBX), and tracks the half-open window of scanlines currently filled.

use crate::source::PageImage;
use crate::transform::TransformSteps;

/// Hard budget for the band buffer, in bytes.
pub const MAX_RASTER_BYTES: u32 = 16 * 1024 * 1024;

/// Where a page image lands on the raster, in pixels from the top left.
/// Offsets may be negative when the image overhangs the page.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
}

impl Placement {
    /// Center `image` on a `width` x `height` raster.
    pub fn centered(image: &PageImage, width: u32, height: u32) -> Placement {
        Placement {
            x: (width as i64 - image.width as i64) / 2,
            y: (height as i64 - image.height as i64) / 2,
        }
    }
}

pub struct BandContext {
    width: u32,
    height: u32,
    bpp: u32,
    band_height: u32,
    buffer: Vec<u8>,
    starty: u32,
    endy: u32,
}

impl BandContext {
    /// Allocate a band for a `width` x `height` page at `bpp` bytes/pixel.
    ///
    /// The band height is the largest whole number of scanlines that fits
    /// the byte budget, clamped to `[1, height]`.
    pub fn new(width: u32, height: u32, bpp: u32) -> BandContext {
        let band_height = (MAX_RASTER_BYTES / (width * bpp)).clamp(1, height.max(1));
        log::debug!(
            "BandContext::new: {width}x{height} at {bpp} B/px, band height {band_height}"
        );
        BandContext {
            width,
            height,
            bpp,
            band_height,
            buffer: vec![0; (band_height * width * bpp) as usize],
            starty: 0,
            endy: 0,
        }
    }

    pub fn band_height(&self) -> u32 {
        self.band_height
    }

    /// Scanline window currently rendered, `[starty, endy)`.
    pub fn window(&self) -> (u32, u32) {
        (self.starty, self.endy)
    }

    /// Whether scanline `y` still needs a band fill.
    pub fn needs_fill(&self, y: u32) -> bool {
        y >= self.endy
    }

    /// Reset the window for a new page.
    pub fn reset(&mut self) {
        self.starty = 0;
        self.endy = 0;
    }

    /// Fill the band with the window starting at scanline `y`.
    ///
    /// The band is cleared to white, then the intersecting rows of `image`
    /// (if any) are copied in, remapped per `steps` for back sides. `limit`
    /// is the last scanline of the page that will be read (inclusive).
    pub fn fill(
        &mut self,
        y: u32,
        limit: u32,
        image: Option<&PageImage>,
        placement: Placement,
        steps: TransformSteps,
    ) {
        self.starty = y;
        self.endy = (y + self.band_height).min(limit + 1).min(self.height);

        let stride = (self.width * self.bpp) as usize;
        let rows = (self.endy - self.starty) as usize;
        self.buffer[..rows * stride].fill(0xFF);

        let Some(image) = image else {
            return;
        };
        if image.bpp != self.bpp {
            return;
        }

        let flip_v = matches!(
            steps,
            TransformSteps::FlipVertical | TransformSteps::Rotate180
        );
        let flip_h = matches!(
            steps,
            TransformSteps::FlipHorizontal | TransformSteps::Rotate180
        );

        for row in 0..rows {
            let raster_y = self.starty + row as u32;
            // The remap flips raster coordinates, not the image itself.
            let src_y = if flip_v {
                self.height as i64 - 1 - raster_y as i64
            } else {
                raster_y as i64
            };
            let image_y = src_y - placement.y;
            if image_y < 0 || image_y >= image.height as i64 {
                continue;
            }
            let dest = &mut self.buffer[row * stride..(row + 1) * stride];
            copy_row(
                dest,
                image,
                image_y as u32,
                placement.x,
                self.width,
                self.bpp,
                flip_h,
            );
        }
    }

    /// Scanline `y`, which must be inside the rendered window.
    pub fn line(&self, y: u32) -> &[u8] {
        assert!(self.starty <= y && y < self.endy, "scanline {y} outside band");
        let stride = (self.width * self.bpp) as usize;
        let start = (y - self.starty) as usize * stride;
        &self.buffer[start..start + stride]
    }

    pub fn line_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(self.starty <= y && y < self.endy, "scanline {y} outside band");
        let stride = (self.width * self.bpp) as usize;
        let start = (y - self.starty) as usize * stride;
        &mut self.buffer[start..start + stride]
    }
}

/// Copy one image row into a white-filled raster row, clipping at both
/// edges. `flip_h` mirrors raster columns.
fn copy_row(
    dest: &mut [u8],
    image: &PageImage,
    image_y: u32,
    offset_x: i64,
    raster_width: u32,
    bpp: u32,
    flip_h: bool,
) {
    let src = image.row(image_y);
    let bpp = bpp as usize;

    for image_x in 0..image.width as i64 {
        let x = offset_x + image_x;
        if x < 0 || x >= raster_width as i64 {
            continue;
        }
        let raster_x = if flip_h {
            raster_width as i64 - 1 - x
        } else {
            x
        } as usize;
        let s = image_x as usize * bpp;
        dest[raster_x * bpp..(raster_x + 1) * bpp].copy_from_slice(&src[s..s + bpp]);
    }
}

/// Pack an RGBX scanline window to RGB in place.
///
/// After the call the first `3 * pixels` bytes hold the packed row: the
/// bytes at source indices {0,1,2, 4,5,6, 8,9,10, ...}.
pub fn pack_rgbx(line: &mut [u8], pixels: usize) {
    for i in 1..pixels {
        line.copy_within(4 * i..4 * i + 3, 3 * i);
    }
}
