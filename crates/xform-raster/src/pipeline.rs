//! Top-level page pipeline.
//!
//! Drives the copies x pages loop: renders each page through the band
//! context, hands scanlines to the selected encoder, reports impression and
//! sheet progress, and inserts the synthetic blank back side that keeps
//! copies of odd-page duplex jobs aligned on sheet boundaries.

use std::io::Write;

use crate::band::{pack_rgbx, BandContext, Placement};
use crate::config::JobConfig;
use crate::encoder::PageEncoder;
use crate::error::Result;
use crate::header::{ColorType, RasterHeader};
use crate::progress::Reporter;
use crate::sink::Sink;
use crate::source::{PageImage, PageSource, RenderOptions};
use crate::transform::{back_transform_steps, TransformSteps};

/// Transform every page of `source` into the encoder's output format.
pub fn run_job(
    source: &mut dyn PageSource,
    encoder: &mut dyn PageEncoder,
    config: &JobConfig,
    sink: &mut Sink,
    reporter: &mut Reporter,
) -> Result<()> {
    let duplex = config.duplex();
    let options = RenderOptions {
        xdpi: config.front.xdpi,
        ydpi: config.front.ydpi,
        width: config.front.width,
        height: config.front.height,
        color_type: config.color_type,
    };
    let mut band = BandContext::new(
        config.front.width,
        config.front.height,
        config.color_type.band_bpp(),
    );
    let mut impressions = 0u32;
    let mut sheets = 0u32;

    log::info!(
        "run_job: {} pages, {} copies, {}x{}dpi, {}",
        config.pages,
        config.copies,
        config.front.xdpi,
        config.front.ydpi,
        config.color_type.as_keyword()
    );

    encoder.start_job(sink)?;

    for copy in 0..config.copies {
        for page in 1..=config.pages {
            let back_side = duplex && page % 2 == 0;
            let header = if back_side {
                &config.back
            } else {
                &config.front
            };
            let steps = if back_side {
                back_transform_steps(config.sheet_back, config.sides.tumble())
            } else {
                TransformSteps::None
            };

            let (page_w, page_h) = source.page_size(page - 1);
            log::debug!(
                "run_job: copy {}/{}, page {page}/{} ({}, {page_w:.0}x{page_h:.0}pt)",
                copy + 1,
                config.copies,
                config.pages,
                if back_side { "back" } else { "front" }
            );

            let image = source.render_page(page - 1, &options)?;
            let placement = Placement::centered(&image, header.width, header.height);
            emit_page(
                encoder,
                header,
                page,
                Some(&image),
                placement,
                steps,
                &mut band,
                sink,
            )?;

            impressions += 1;
            reporter.attr("job-impressions-completed", impressions);
            if !duplex || page % 2 == 1 {
                sheets += 1;
                reporter.attr("job-media-sheets-completed", sheets);
            }
        }

        if config.blank_back() {
            // Odd page count, duplexed and copied: pad the last sheet so
            // the next copy starts on a fresh front side.
            let page = config.pages + 1;
            log::debug!("run_job: copy {}, blank back page {page}", copy + 1);
            emit_page(
                encoder,
                &config.back,
                page,
                None,
                Placement { x: 0, y: 0 },
                TransformSteps::None,
                &mut band,
                sink,
            )?;
            impressions += 1;
            reporter.attr("job-impressions-completed", impressions);
        }
    }

    encoder.end_job(sink)?;
    sink.flush()?;
    Ok(())
}

/// Feed one page (or a blank side when `image` is `None`) through the
/// encoder, band by band.
#[allow(clippy::too_many_arguments)]
fn emit_page(
    encoder: &mut dyn PageEncoder,
    header: &RasterHeader,
    page: u32,
    image: Option<&PageImage>,
    placement: Placement,
    steps: TransformSteps,
    band: &mut BandContext,
    sink: &mut Sink,
) -> Result<()> {
    let b = encoder.start_page(page, header, sink)?;
    let window_px = b.width() as usize;
    band.reset();

    for y in b.top..=b.bottom {
        if band.needs_fill(y) {
            band.fill(y, b.bottom, image, placement, steps);
        }
        let line = band.line_mut(y);
        let slice: &[u8] = match header.color_type {
            ColorType::Sgray8 => {
                let start = b.left as usize;
                &line[start..start + window_px]
            }
            ColorType::Srgb8 => {
                let start = b.left as usize * 4;
                let window = &mut line[start..start + window_px * 4];
                pack_rgbx(window, window_px);
                &window[..window_px * 3]
            }
        };
        encoder.write_line(y, slice, sink)?;
    }

    encoder.end_page(page, sink)
}
