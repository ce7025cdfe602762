//! HP PCL page encoder.
//!
//! Compiles a grayscale scanline stream into escape-sequenced raster
//! graphics: per-page size/orientation/margin setup, ordered dither to
//! 1 bit, PackBits row compression, and blank-row skips.
//!
//! Escape layout per page:
//!   front side     ESC&l12D ESC&k12H   12 lines/inch, 10 chars/inch
//!                  ESC&l0O             portrait
//!                  ESC&l<code>A        page size (omitted when unknown)
//!                  ESC&l<n>E ESC&l0L   top margin in text lines, no perf skip
//!                  ESC&l<1|2>S         duplex mode (duplex jobs only)
//!   back side      ESC&a2G             print on back of sheet
//!   graphics       ESC*t<dpi>R ESC*r<w>S ESC*r<h>T
//!                  ESC&a0H ESC&a<v>V   cursor to top of image box
//!                  ESC*b2M ESC*r1A     PackBits, start raster
//!   per row        ESC*b<n>Y           pending blank-row skip
//!                  ESC*b<n>W <bytes>   compressed row
//!   end of page    ESC*r0B, formfeed after simplex pages and odd duplex pages

use std::io::Write;

use crate::dither::dither_line;
use crate::encoder::{ImageBox, PageEncoder};
use crate::error::Result;
use crate::header::RasterHeader;
use crate::packbits;
use crate::sink::Sink;

/// Page-size codes by page height in printer points.
const PAGE_SIZES: &[(u32, u32)] = &[
    (540, 80),  // Monarch envelope
    (595, 25),  // A5
    (624, 90),  // DL envelope
    (649, 91),  // C5 envelope
    (684, 81),  // COM-10 envelope
    (709, 100), // B5 envelope
    (756, 1),   // Executive
    (792, 2),   // Letter
    (842, 26),  // A4
    (1008, 3),  // Legal
    (1191, 27), // A3
    (1224, 6),  // Tabloid
];

fn page_size_code(height_points: u32) -> Option<u32> {
    PAGE_SIZES
        .iter()
        .find(|(pts, _)| *pts == height_points)
        .map(|(_, code)| *code)
}

#[derive(Default)]
pub struct PclEncoder {
    left: u32,
    top: u32,
    duplex: bool,
    /// Run length of blank rows not yet emitted.
    out_blanks: u32,
    /// 1-bit packed row.
    out_buffer: Vec<u8>,
    /// PackBits output for one row.
    comp_buffer: Vec<u8>,
}

impl PclEncoder {
    pub fn new() -> PclEncoder {
        PclEncoder::default()
    }

    /// Image box inside the unprintable margins.
    ///
    /// Top and bottom margins are `ydpi/6`; side margins `xdpi/4`, except
    /// A4 which centers an 8-inch-wide image.
    fn image_box(header: &RasterHeader) -> ImageBox {
        let top = header.ydpi / 6;
        let (left, right) = if header.page_height_pts == 842 {
            let left = (header.width - 8 * header.xdpi) / 2;
            (left, left + 8 * header.xdpi - 1)
        } else {
            let margin = header.xdpi / 4;
            (margin, header.width - margin - 1)
        };
        ImageBox {
            left,
            top,
            right,
            bottom: header.height - top - 1,
        }
    }

    fn flush_blanks(&mut self, sink: &mut Sink) -> Result<()> {
        if self.out_blanks > 0 {
            write!(sink, "\x1b*b{}Y", self.out_blanks)?;
            self.out_blanks = 0;
        }
        Ok(())
    }
}

impl PageEncoder for PclEncoder {
    fn start_job(&mut self, sink: &mut Sink) -> Result<()> {
        // Printer reset, once per job.
        write!(sink, "\x1bE")?;
        Ok(())
    }

    fn start_page(
        &mut self,
        page: u32,
        header: &RasterHeader,
        sink: &mut Sink,
    ) -> Result<ImageBox> {
        let b = Self::image_box(header);
        self.left = b.left;
        self.top = b.top;
        self.duplex = header.duplex;
        self.out_blanks = 0;

        log::debug!(
            "PclEncoder::start_page: page {page}, box {}..{} x {}..{}",
            b.left,
            b.right,
            b.top,
            b.bottom
        );

        let front = !header.duplex || page % 2 == 1;
        if front {
            write!(sink, "\x1b&l12D\x1b&k12H")?;
            write!(sink, "\x1b&l0O")?;
            if let Some(code) = page_size_code(header.page_height_pts) {
                write!(sink, "\x1b&l{code}A")?;
            }
            write!(sink, "\x1b&l{}E\x1b&l0L", 12 * b.top / header.ydpi)?;
            if header.duplex {
                write!(sink, "\x1b&l{}S", 1 + header.tumble as u32)?;
            }
        } else {
            write!(sink, "\x1b&a2G")?;
        }

        write!(sink, "\x1b*t{}R", header.xdpi)?;
        write!(sink, "\x1b*r{}S", b.width())?;
        write!(sink, "\x1b*r{}T", b.height())?;
        write!(sink, "\x1b&a0H")?;
        write!(sink, "\x1b&a{}V", 720 * b.top / header.ydpi)?;
        write!(sink, "\x1b*b2M")?;
        write!(sink, "\x1b*r1A")?;

        let row_bytes = (b.width() as usize).div_ceil(8);
        self.out_buffer = vec![0; row_bytes];
        self.comp_buffer = Vec::with_capacity(2 * row_bytes + 2);
        Ok(b)
    }

    fn write_line(&mut self, y: u32, line: &[u8], sink: &mut Sink) -> Result<()> {
        if line[0] == 0xFF && line.iter().all(|&b| b == 0xFF) {
            self.out_blanks += 1;
            return Ok(());
        }

        let n = dither_line(line, self.left, y, &mut self.out_buffer);
        self.comp_buffer.clear();
        packbits::compress(&self.out_buffer[..n], &mut self.comp_buffer);

        self.flush_blanks(sink)?;
        write!(sink, "\x1b*b{}W", self.comp_buffer.len())?;
        sink.write_all(&self.comp_buffer)?;
        Ok(())
    }

    fn end_page(&mut self, page: u32, sink: &mut Sink) -> Result<()> {
        self.flush_blanks(sink)?;
        write!(sink, "\x1b*r0B")?;
        if !self.duplex || page % 2 == 1 {
            sink.write_all(b"\x0c")?;
        }
        self.out_buffer = Vec::new();
        self.comp_buffer = Vec::new();
        Ok(())
    }

    fn end_job(&mut self, sink: &mut Sink) -> Result<()> {
        write!(sink, "\x1bE")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{ColorType, SheetBack, Sides};
    use crate::media::Media;

    fn header(media: &str, dpi: u32, sides: Sides) -> RasterHeader {
        RasterHeader::new(
            Media::lookup(media).unwrap(),
            dpi,
            dpi,
            ColorType::Sgray8,
            sides,
            1,
            SheetBack::Normal,
            false,
        )
    }

    fn capture() -> (Sink, std::sync::Arc<std::sync::Mutex<Vec<u8>>>) {
        use std::sync::{Arc, Mutex};

        #[derive(Clone)]
        struct Buf(Arc<Mutex<Vec<u8>>>);
        impl std::io::Write for Buf {
            fn write(&mut self, b: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(b);
                Ok(b.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let shared = Arc::new(Mutex::new(Vec::new()));
        (Sink::from_writer(Box::new(Buf(shared.clone()))), shared)
    }

    #[test]
    fn test_page_size_codes() {
        assert_eq!(page_size_code(792), Some(2));
        assert_eq!(page_size_code(842), Some(26));
        assert_eq!(page_size_code(1008), Some(3));
        assert_eq!(page_size_code(617), None);
    }

    #[test]
    fn test_letter_image_box() {
        let b = PclEncoder::image_box(&header("na_letter_8.5x11in", 600, Sides::OneSided));
        assert_eq!(b.left, 150);
        assert_eq!(b.right, 4949);
        assert_eq!(b.top, 100);
        assert_eq!(b.bottom, 6499);
    }

    #[test]
    fn test_a4_image_box_centers_eight_inches() {
        let b = PclEncoder::image_box(&header("iso_a4_210x297mm", 300, Sides::OneSided));
        // A4 at 300dpi is 2480 px wide; the 2400 px image is centered.
        assert_eq!(b.left, 40);
        assert_eq!(b.right, 2439);
        assert_eq!(b.width(), 2400);
    }

    #[test]
    fn test_front_page_setup_escapes() {
        let (mut sink, shared) = capture();
        let mut enc = PclEncoder::new();
        let h = header("na_letter_8.5x11in", 600, Sides::OneSided);
        enc.start_job(&mut sink).unwrap();
        enc.start_page(1, &h, &mut sink).unwrap();

        let bytes = shared.lock().unwrap().clone();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        assert!(text.starts_with("\x1bE"));
        assert!(text.contains("\x1b&l2A"), "page size code: {text:?}");
        assert!(text.contains("\x1b&l2E"), "top margin: {text:?}");
        assert!(text.contains("\x1b*t600R"));
        assert!(text.contains("\x1b*r4800S"));
        assert!(text.contains("\x1b*r6400T"));
        assert!(text.contains("\x1b&a120V"));
        assert!(text.contains("\x1b*b2M"));
        assert!(text.ends_with("\x1b*r1A"));
        // Simplex: no duplex escape.
        assert!(!text.contains("S\x1b*t"));
    }

    #[test]
    fn test_back_page_setup() {
        let (mut sink, shared) = capture();
        let mut enc = PclEncoder::new();
        let h = header("na_letter_8.5x11in", 300, Sides::TwoSidedLongEdge);
        enc.start_page(2, &h, &mut sink).unwrap();

        let bytes = shared.lock().unwrap().clone();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        assert!(text.starts_with("\x1b&a2G"));
        assert!(!text.contains("\x1b&l0O"));
    }

    #[test]
    fn test_duplex_mode_escape() {
        for (sides, escape) in [
            (Sides::TwoSidedLongEdge, "\x1b&l1S"),
            (Sides::TwoSidedShortEdge, "\x1b&l2S"),
        ] {
            let (mut sink, shared) = capture();
            let mut enc = PclEncoder::new();
            enc.start_page(1, &header("na_letter_8.5x11in", 300, sides), &mut sink)
                .unwrap();
            let bytes = shared.lock().unwrap().clone();
            let text = String::from_utf8_lossy(&bytes).into_owned();
            assert!(text.contains(escape), "{sides:?}: {text:?}");
        }
    }

    #[test]
    fn test_blank_rows_accumulate_and_flush() {
        let (mut sink, shared) = capture();
        let mut enc = PclEncoder::new();
        let h = header("na_letter_8.5x11in", 300, Sides::OneSided);
        let b = enc.start_page(1, &h, &mut sink).unwrap();
        let before = shared.lock().unwrap().len();

        let blank = vec![0xFF; b.width() as usize];
        let mut dark = blank.clone();
        dark[0] = 0x00;

        enc.write_line(b.top, &blank, &mut sink).unwrap();
        enc.write_line(b.top + 1, &blank, &mut sink).unwrap();
        assert_eq!(shared.lock().unwrap().len(), before, "blanks buffered");

        enc.write_line(b.top + 2, &dark, &mut sink).unwrap();
        let bytes = shared.lock().unwrap()[before..].to_vec();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        assert!(text.starts_with("\x1b*b2Y\x1b*b"), "{text:?}");
    }

    #[test]
    fn test_formfeed_parity() {
        // Simplex: formfeed after every page; duplex: after odd pages only.
        for (sides, page, expect_ff) in [
            (Sides::OneSided, 1, true),
            (Sides::OneSided, 2, true),
            (Sides::TwoSidedLongEdge, 1, true),
            (Sides::TwoSidedLongEdge, 2, false),
        ] {
            let (mut sink, shared) = capture();
            let mut enc = PclEncoder::new();
            let h = header("na_letter_8.5x11in", 300, sides);
            enc.start_page(page, &h, &mut sink).unwrap();
            let before = shared.lock().unwrap().len();
            enc.end_page(page, &mut sink).unwrap();
            let bytes = shared.lock().unwrap()[before..].to_vec();
            assert_eq!(
                bytes.ends_with(b"\x0c"),
                expect_ff,
                "{sides:?} page {page}"
            );
        }
    }
}
