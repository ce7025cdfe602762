//! PWG raster page encoder.
//!
//! The stream is the 4-byte `RaS2` sync word followed, per page, by a
//! 1796-byte big-endian page header and the uncompressed pixel rows in
//! top-to-bottom order at `bytes_per_line` each.
//!
//! Header field offsets (shared with the CUPS v2 page header):
//!   offset 0:    MediaClass[64] = "PwgRaster"
//!   offset 272:  Duplex (0/1)
//!   offset 276:  HWResolution[2]
//!   offset 352:  PageSize[2] (printer points)
//!   offset 368:  Tumble (0/1)
//!   offset 372:  cupsWidth
//!   offset 376:  cupsHeight
//!   offset 384:  cupsBitsPerColor
//!   offset 388:  cupsBitsPerPixel
//!   offset 392:  cupsBytesPerLine
//!   offset 396:  cupsColorOrder (0 = chunky)
//!   offset 400:  cupsColorSpace (18 = sgray, 19 = srgb)
//!   offset 420:  cupsNumColors
//!   offset 452:  cupsInteger[0] = TotalPageCount
//!   offset 456:  cupsInteger[1] = CrossFeedTransform (+1/-1)
//!   offset 460:  cupsInteger[2] = FeedTransform (+1/-1)
//!   offset 1732: cupsPageSizeName[64]
//! All other fields are zero.

use std::io::Write;

use crate::encoder::{ImageBox, PageEncoder};
use crate::error::Result;
use crate::header::RasterHeader;
use crate::sink::Sink;

/// Stream sync word.
pub const SYNC_WORD: &[u8; 4] = b"RaS2";

/// Page header size in bytes.
pub const HEADER_SIZE: usize = 1796;

/// Serialize a page header.
pub fn write_header(header: &RasterHeader) -> [u8; HEADER_SIZE] {
    let mut buf = [0u8; HEADER_SIZE];

    put_cstring(&mut buf[0..64], "PwgRaster");
    put_u32(&mut buf, 272, header.duplex as u32);
    put_u32(&mut buf, 276, header.xdpi);
    put_u32(&mut buf, 280, header.ydpi);
    put_u32(&mut buf, 352, header.page_width_pts);
    put_u32(&mut buf, 356, header.page_height_pts);
    put_u32(&mut buf, 368, header.tumble as u32);
    put_u32(&mut buf, 372, header.width);
    put_u32(&mut buf, 376, header.height);
    put_u32(&mut buf, 384, 8);
    put_u32(&mut buf, 388, header.bits_per_pixel);
    put_u32(&mut buf, 392, header.bytes_per_line);
    put_u32(&mut buf, 400, header.color_type.color_space());
    put_u32(&mut buf, 420, header.color_type.num_colors());
    put_u32(&mut buf, 452, header.total_page_count);
    put_u32(&mut buf, 456, header.cross_feed_transform as u32);
    put_u32(&mut buf, 460, header.feed_transform as u32);
    put_cstring(&mut buf[1732..1796], &header.media.name);

    buf
}

fn put_u32(buf: &mut [u8; HEADER_SIZE], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

fn put_cstring(field: &mut [u8], value: &str) {
    // Truncate to the field size, leaving at least one NUL.
    let bytes = value.as_bytes();
    let len = bytes.len().min(field.len() - 1);
    field[..len].copy_from_slice(&bytes[..len]);
}

#[derive(Default)]
pub struct PwgEncoder;

impl PwgEncoder {
    pub fn new() -> PwgEncoder {
        PwgEncoder
    }
}

impl PageEncoder for PwgEncoder {
    fn start_job(&mut self, sink: &mut Sink) -> Result<()> {
        sink.write_all(SYNC_WORD)?;
        Ok(())
    }

    fn start_page(
        &mut self,
        page: u32,
        header: &RasterHeader,
        sink: &mut Sink,
    ) -> Result<ImageBox> {
        log::debug!(
            "PwgEncoder::start_page: page {page}, {}x{} {}",
            header.width,
            header.height,
            header.color_type.as_keyword()
        );
        sink.write_all(&write_header(header))?;
        Ok(ImageBox {
            left: 0,
            top: 0,
            right: header.width - 1,
            bottom: header.height - 1,
        })
    }

    fn write_line(&mut self, _y: u32, line: &[u8], sink: &mut Sink) -> Result<()> {
        sink.write_all(line)?;
        Ok(())
    }

    fn end_page(&mut self, _page: u32, _sink: &mut Sink) -> Result<()> {
        Ok(())
    }

    fn end_job(&mut self, sink: &mut Sink) -> Result<()> {
        sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{ColorType, SheetBack, Sides};
    use crate::media::Media;

    fn get_u32(buf: &[u8], offset: usize) -> u32 {
        u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_header_fields() {
        let header = RasterHeader::new(
            Media::lookup("na_letter_8.5x11in").unwrap(),
            300,
            300,
            ColorType::Sgray8,
            Sides::OneSided,
            3,
            SheetBack::Normal,
            false,
        );
        let buf = write_header(&header);

        assert_eq!(&buf[0..9], b"PwgRaster");
        assert_eq!(buf[9], 0);
        assert_eq!(get_u32(&buf, 272), 0); // simplex
        assert_eq!(get_u32(&buf, 276), 300);
        assert_eq!(get_u32(&buf, 280), 300);
        assert_eq!(get_u32(&buf, 352), 612);
        assert_eq!(get_u32(&buf, 356), 792);
        assert_eq!(get_u32(&buf, 372), 2550);
        assert_eq!(get_u32(&buf, 376), 3300);
        assert_eq!(get_u32(&buf, 384), 8);
        assert_eq!(get_u32(&buf, 388), 8);
        assert_eq!(get_u32(&buf, 392), 2550);
        assert_eq!(get_u32(&buf, 400), 18); // sgray
        assert_eq!(get_u32(&buf, 420), 1);
        assert_eq!(get_u32(&buf, 452), 3); // TotalPageCount
        assert_eq!(get_u32(&buf, 456), 1);
        assert_eq!(get_u32(&buf, 460), 1);
        assert_eq!(&buf[1732..1750], b"na_letter_8.5x11in");
    }

    #[test]
    fn test_back_header_transform_ints() {
        let back = RasterHeader::new(
            Media::lookup("iso_a4_210x297mm").unwrap(),
            300,
            300,
            ColorType::Sgray8,
            Sides::TwoSidedLongEdge,
            2,
            SheetBack::Flipped,
            true,
        );
        let buf = write_header(&back);
        assert_eq!(get_u32(&buf, 272), 1); // duplex
        assert_eq!(get_u32(&buf, 456), 1); // cross-feed
        assert_eq!(get_u32(&buf, 460), (-1i32) as u32); // feed
    }

    #[test]
    fn test_srgb_header() {
        let header = RasterHeader::new(
            Media::lookup("na_letter_8.5x11in").unwrap(),
            300,
            300,
            ColorType::Srgb8,
            Sides::OneSided,
            1,
            SheetBack::Normal,
            false,
        );
        let buf = write_header(&header);
        assert_eq!(get_u32(&buf, 388), 24);
        assert_eq!(get_u32(&buf, 392), 7650);
        assert_eq!(get_u32(&buf, 400), 19); // srgb
        assert_eq!(get_u32(&buf, 420), 3);
    }
}
