//! Per-page raster descriptors shared by the PWG and PCL encoders.

use crate::media::Media;
use crate::transform::{back_transform_steps, TransformSteps};

/// Raster pixel layout for rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    /// 8-bit grayscale, one byte per pixel on the wire.
    Sgray8,
    /// 8-bit sRGB, rendered as 4-byte RGBX and packed to 3 bytes on the wire.
    Srgb8,
}

impl ColorType {
    pub fn parse(keyword: &str) -> Option<ColorType> {
        match keyword {
            "sgray_8" => Some(ColorType::Sgray8),
            "srgb_8" => Some(ColorType::Srgb8),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> &'static str {
        match self {
            ColorType::Sgray8 => "sgray_8",
            ColorType::Srgb8 => "srgb_8",
        }
    }

    /// Bytes per pixel in the band buffer.
    pub fn band_bpp(&self) -> u32 {
        match self {
            ColorType::Sgray8 => 1,
            ColorType::Srgb8 => 4,
        }
    }

    /// Bytes per pixel on the wire.
    pub fn out_bpp(&self) -> u32 {
        match self {
            ColorType::Sgray8 => 1,
            ColorType::Srgb8 => 3,
        }
    }

    /// PWG raster color-space identifier.
    pub fn color_space(&self) -> u32 {
        match self {
            ColorType::Sgray8 => 18,
            ColorType::Srgb8 => 19,
        }
    }

    pub fn num_colors(&self) -> u32 {
        match self {
            ColorType::Sgray8 => 1,
            ColorType::Srgb8 => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sides {
    OneSided,
    TwoSidedLongEdge,
    TwoSidedShortEdge,
}

impl Sides {
    pub fn parse(keyword: &str) -> Option<Sides> {
        match keyword {
            "one-sided" => Some(Sides::OneSided),
            "two-sided-long-edge" => Some(Sides::TwoSidedLongEdge),
            "two-sided-short-edge" => Some(Sides::TwoSidedShortEdge),
            _ => None,
        }
    }

    pub fn is_duplex(&self) -> bool {
        !matches!(self, Sides::OneSided)
    }

    /// Short-edge duplex flips the sheet upward.
    pub fn tumble(&self) -> bool {
        matches!(self, Sides::TwoSidedShortEdge)
    }
}

/// Back-side image alignment across duplex hardware behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetBack {
    Normal,
    Flipped,
    ManualTumble,
    Rotated,
}

impl SheetBack {
    pub fn parse(keyword: &str) -> Option<SheetBack> {
        match keyword {
            "normal" => Some(SheetBack::Normal),
            "flipped" => Some(SheetBack::Flipped),
            "manual-tumble" => Some(SheetBack::ManualTumble),
            "rotated" => Some(SheetBack::Rotated),
            _ => None,
        }
    }
}

/// Fixed-shape page descriptor, constructed once per job side.
///
/// The front and back instances differ only in the cross-feed/feed transform
/// encoding derived from the sheet-back keyword.
#[derive(Debug, Clone)]
pub struct RasterHeader {
    pub media: Media,
    pub xdpi: u32,
    pub ydpi: u32,
    /// Page width in pixels.
    pub width: u32,
    /// Page height in pixels (scanlines).
    pub height: u32,
    pub bytes_per_line: u32,
    pub bits_per_pixel: u32,
    pub color_type: ColorType,
    pub duplex: bool,
    pub tumble: bool,
    /// Page size in printer points.
    pub page_width_pts: u32,
    pub page_height_pts: u32,
    /// copies x effective pages, counting any synthetic blank back sides.
    pub total_page_count: u32,
    /// +1/-1 transform encodings for the raster header.
    pub cross_feed_transform: i32,
    pub feed_transform: i32,
}

impl RasterHeader {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        media: Media,
        xdpi: u32,
        ydpi: u32,
        color_type: ColorType,
        sides: Sides,
        total_page_count: u32,
        sheet_back: SheetBack,
        back_side: bool,
    ) -> RasterHeader {
        let width = (media.width as u64 * xdpi as u64 / 2540) as u32;
        let height = (media.height as u64 * ydpi as u64 / 2540) as u32;
        let (cross_feed_transform, feed_transform) = if back_side && sides.is_duplex() {
            match back_transform_steps(sheet_back, sides.tumble()) {
                TransformSteps::None => (1, 1),
                TransformSteps::FlipVertical => (1, -1),
                TransformSteps::FlipHorizontal => (-1, 1),
                TransformSteps::Rotate180 => (-1, -1),
            }
        } else {
            (1, 1)
        };

        RasterHeader {
            page_width_pts: media.width_points(),
            page_height_pts: media.height_points(),
            media,
            xdpi,
            ydpi,
            width,
            height,
            bytes_per_line: width * color_type.out_bpp(),
            bits_per_pixel: color_type.out_bpp() * 8,
            color_type,
            duplex: sides.is_duplex(),
            tumble: sides.tumble(),
            total_page_count,
            cross_feed_transform,
            feed_transform,
        }
    }
}
