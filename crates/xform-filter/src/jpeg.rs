//! JPEG page source.
//!
//! A JPEG prints as a one-page document: the decoded image is scaled to
//! fit the page raster (preserving aspect ratio) and handed to the
//! pipeline, which centers it.

use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;
use xform_raster::error::{Error, Result};
use xform_raster::header::ColorType;
use xform_raster::source::{PageImage, PageSource, RenderOptions};

pub struct JpegSource {
    image: DynamicImage,
}

impl JpegSource {
    pub fn open(path: &Path) -> Result<JpegSource> {
        let image = image::ImageReader::open(path)
            .map_err(|e| Error::Input(format!("Unable to open '{}': {e}", path.display())))?
            .decode()
            .map_err(|e| {
                Error::Input(format!("Unable to decode '{}': {e}", path.display()))
            })?;
        Ok(JpegSource { image })
    }
}

impl PageSource for JpegSource {
    fn page_count(&self) -> u32 {
        1
    }

    fn page_size(&self, _index: u32) -> (f64, f64) {
        // Natural size at 72 pixels per inch.
        (self.image.width() as f64, self.image.height() as f64)
    }

    fn is_color(&self) -> bool {
        self.image.color().has_color()
    }

    fn render_page(&mut self, _index: u32, options: &RenderOptions) -> Result<PageImage> {
        log::debug!(
            "JpegSource::render_page: {}x{} onto {}x{}",
            self.image.width(),
            self.image.height(),
            options.width,
            options.height
        );

        let scaled = self
            .image
            .resize(options.width, options.height, FilterType::CatmullRom);

        Ok(match options.color_type {
            ColorType::Srgb8 => {
                let rgba = scaled.to_rgba8();
                let (w, h) = (rgba.width(), rgba.height());
                PageImage::new_rgbx(w, h, rgba.into_raw())
            }
            ColorType::Sgray8 => {
                let gray = scaled.to_luma8();
                let (w, h) = (gray.width(), gray.height());
                PageImage::new_gray(w, h, gray.into_raw())
            }
        })
    }
}
