//! PDF page source over the hayro rasterizer.

use std::path::Path;
use std::sync::Arc;

use hayro::{render, InterpreterSettings, Pdf, RenderSettings};
use xform_raster::error::{Error, Result};
use xform_raster::header::ColorType;
use xform_raster::source::{PageImage, PageSource, RenderOptions};

pub struct PdfSource {
    pdf: Pdf,
    settings: InterpreterSettings,
}

impl PdfSource {
    /// Open and pre-flight a PDF document.
    ///
    /// hayro rejects encrypted documents at open, which covers the
    /// locked-document case; a file that opens is printable.
    pub fn open(path: &Path) -> Result<PdfSource> {
        let data = std::fs::read(path)
            .map_err(|e| Error::Input(format!("Unable to open '{}': {e}", path.display())))?;
        let pdf = Pdf::new(Arc::new(data)).map_err(|_| {
            Error::Input(format!(
                "Unable to read PDF file '{}' (damaged or password protected).",
                path.display()
            ))
        })?;
        if pdf.pages().is_empty() {
            return Err(Error::Input(format!(
                "PDF file '{}' has no pages.",
                path.display()
            )));
        }
        Ok(PdfSource {
            pdf,
            settings: InterpreterSettings::default(),
        })
    }
}

impl PageSource for PdfSource {
    fn page_count(&self) -> u32 {
        self.pdf.pages().len() as u32
    }

    fn page_size(&self, index: u32) -> (f64, f64) {
        let (w, h) = self.pdf.pages()[index as usize].render_dimensions();
        (w as f64, h as f64)
    }

    fn is_color(&self) -> bool {
        // PDF content is assumed colored; print-color-mode may still force
        // grayscale upstream.
        true
    }

    fn render_page(&mut self, index: u32, options: &RenderOptions) -> Result<PageImage> {
        let pages = self.pdf.pages();
        let page = pages
            .get(index as usize)
            .ok_or_else(|| Error::Input(format!("No such page {}.", index + 1)))?;

        log::debug!(
            "PdfSource::render_page: page {} at {}x{}dpi",
            index + 1,
            options.xdpi,
            options.ydpi
        );

        let pixmap = render(
            page,
            &self.settings,
            &RenderSettings {
                x_scale: options.xdpi as f32 / 72.0,
                y_scale: options.ydpi as f32 / 72.0,
                ..Default::default()
            },
        );
        let width = pixmap.width() as u32;
        let height = pixmap.height() as u32;
        let rgba = pixmap.take_u8();

        Ok(match options.color_type {
            ColorType::Srgb8 => PageImage::new_rgbx(width, height, rgba),
            ColorType::Sgray8 => {
                let gray = rgba
                    .chunks_exact(4)
                    .map(|px| luma(px[0], px[1], px[2]))
                    .collect();
                PageImage::new_gray(width, height, gray)
            }
        })
    }
}

/// ITU-R 601 luma, integer weights summing to 256.
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 77 + g as u32 * 150 + b as u32 * 29) >> 8) as u8
}
