//! Job configuration.
//!
//! Resolves media, resolution, color type, sides and copies from the merged
//! option map plus the printer's supported lists, and builds the front and
//! back page descriptors for the job.

use crate::error::{Error, Result};
use crate::header::{ColorType, RasterHeader, SheetBack, Sides};
use crate::media::Media;
use crate::options::Options;

/// Everything the configurator needs to resolve a job.
pub struct JobSetup<'a> {
    pub options: &'a Options,
    /// Supported resolutions, best last not required; median is positional.
    pub resolutions: &'a [(u32, u32)],
    pub types: &'a [ColorType],
    pub sheet_back: SheetBack,
    /// Printable pages in the input document.
    pub pages: u32,
    /// Whether the document carries color content.
    pub color: bool,
    pub media_default: Option<&'a str>,
    pub sides_default: Option<&'a str>,
}

/// Immutable per-job geometry and sequencing parameters.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub front: RasterHeader,
    pub back: RasterHeader,
    pub color_type: ColorType,
    pub sides: Sides,
    pub sheet_back: SheetBack,
    pub copies: u32,
    pub pages: u32,
}

impl JobConfig {
    pub fn duplex(&self) -> bool {
        self.sides.is_duplex()
    }

    /// Whether each copy gets a synthetic blank back side appended.
    pub fn blank_back(&self) -> bool {
        self.duplex() && self.copies > 1 && self.pages % 2 == 1
    }

    /// Pages per copy including any synthetic blank back.
    pub fn pages_effective(&self) -> u32 {
        self.pages + self.blank_back() as u32
    }
}

/// Parse `WxHdpi` or `Ndpi` (square). Anything else is rejected.
pub fn parse_resolution(value: &str) -> Option<(u32, u32)> {
    let value = value.strip_suffix("dpi")?;
    let (x, y) = match value.split_once('x') {
        Some((x, y)) => (x, y),
        None => (value, value),
    };
    let x: u32 = x.parse().ok().filter(|v| *v > 0)?;
    let y: u32 = y.parse().ok().filter(|v| *v > 0)?;
    Some((x, y))
}

/// Parse a comma-separated supported-resolutions list.
pub fn parse_resolution_list(list: &str) -> Result<Vec<(u32, u32)>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            parse_resolution(s)
                .ok_or_else(|| Error::Config(format!("Bad resolution value '{s}'.")))
        })
        .collect()
}

/// Parse a comma-separated supported-types list.
pub fn parse_type_list(list: &str) -> Result<Vec<ColorType>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            ColorType::parse(s)
                .ok_or_else(|| Error::Config(format!("Unsupported raster type '{s}'.")))
        })
        .collect()
}

/// Pick the job resolution from the option map and the supported list.
fn resolve_resolution(options: &Options, supported: &[(u32, u32)]) -> Result<(u32, u32)> {
    if supported.is_empty() {
        return Err(Error::Config("No supported resolutions.".to_string()));
    }

    if let Some(value) = options.get("printer-resolution") {
        match parse_resolution(value) {
            Some(res) if supported.contains(&res) => return Ok(res),
            _ => {
                log::info!("Ignoring unsupported \"printer-resolution\" value '{value}'.");
            }
        }
    }

    if let Some(value) = options.get("print-quality") {
        let index = match value {
            "3" | "draft" => Some(0),
            "4" | "normal" => Some(supported.len() / 2),
            "5" | "high" => Some(supported.len() - 1),
            _ => {
                log::info!("Ignoring unknown \"print-quality\" value '{value}'.");
                None
            }
        };
        if let Some(index) = index {
            return Ok(supported[index]);
        }
    }

    Ok(supported[supported.len() / 2])
}

/// Resolve media from `media`, `media-col`, the environment default, or
/// US Letter.
fn resolve_media(options: &Options, media_default: Option<&str>) -> Result<Media> {
    if let Some(name) = options.get("media") {
        return Media::lookup(name)
            .ok_or_else(|| Error::Config(format!("Unknown \"media\" value '{name}'.")));
    }

    if let Some(col) = options.collection("media-col") {
        if let Some(name) = col.get("media-size-name") {
            return Media::lookup(name).ok_or_else(|| {
                Error::Config(format!("Unknown \"media-size-name\" value '{name}'."))
            });
        }
        if let Some(size) = col.collection("media-size") {
            let x = parse_dimension(&size, "x-dimension")?;
            let y = parse_dimension(&size, "y-dimension")?;
            return Ok(Media::from_dimensions(x, y));
        }
        return Err(Error::Config("Bad \"media-col\" value.".to_string()));
    }

    let name = media_default.unwrap_or("na_letter_8.5x11in");
    Media::lookup(name).ok_or_else(|| Error::Config(format!("Unknown \"media\" value '{name}'.")))
}

fn parse_dimension(size: &Options, name: &str) -> Result<u32> {
    size.get(name)
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| Error::Config(format!("Bad \"media-size\" {name} value.")))
}

fn resolve_sides(options: &Options, sides_default: Option<&str>, pages: u32) -> Result<Sides> {
    if pages == 1 {
        return Ok(Sides::OneSided);
    }
    let keyword = options
        .get("sides")
        .or(sides_default)
        .unwrap_or("one-sided");
    Sides::parse(keyword)
        .ok_or_else(|| Error::Config(format!("Unknown \"sides\" value '{keyword}'.")))
}

fn resolve_copies(options: &Options) -> Result<u32> {
    let Some(value) = options.get("copies") else {
        return Ok(1);
    };
    value
        .parse::<u32>()
        .ok()
        .filter(|v| (1..=9999).contains(v))
        .ok_or_else(|| Error::Config(format!("Bad \"copies\" value '{value}'.")))
}

/// Resolve the whole job configuration.
pub fn configure(setup: &JobSetup) -> Result<JobConfig> {
    let (xdpi, ydpi) = resolve_resolution(setup.options, setup.resolutions)?;
    let media = resolve_media(setup.options, setup.media_default)?;
    let sides = resolve_sides(setup.options, setup.sides_default, setup.pages)?;
    let copies = resolve_copies(setup.options)?;

    let color_type = if setup.color && setup.types.contains(&ColorType::Srgb8) {
        ColorType::Srgb8
    } else {
        ColorType::Sgray8
    };

    let duplex = sides.is_duplex();
    let blank_back = duplex && copies > 1 && setup.pages % 2 == 1;
    let total = copies * (setup.pages + blank_back as u32);

    log::debug!(
        "configure: {} {}x{}dpi {} {:?} copies={copies} pages={} total={total}",
        media.name,
        xdpi,
        ydpi,
        color_type.as_keyword(),
        sides,
        setup.pages
    );

    let front = RasterHeader::new(
        media.clone(),
        xdpi,
        ydpi,
        color_type,
        sides,
        total,
        setup.sheet_back,
        false,
    );
    if front.width == 0 || front.height == 0 {
        return Err(Error::RasterSetup(format!(
            "page raster for '{}' at {xdpi}x{ydpi}dpi is empty",
            front.media.name
        )));
    }
    let back = RasterHeader::new(
        media,
        xdpi,
        ydpi,
        color_type,
        sides,
        total,
        setup.sheet_back,
        true,
    );

    Ok(JobConfig {
        front,
        back,
        color_type,
        sides,
        sheet_back: setup.sheet_back,
        copies,
        pages: setup.pages,
    })
}
