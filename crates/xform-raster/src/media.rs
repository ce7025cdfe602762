//! Media size database.
//!
//! Sizes are kept in PWG units (1/2540 inch) and looked up either by a PWG
//! self-describing name (`class_name_WxHin`, `class_name_WxHmm`) or by one
//! of the legacy aliases still seen in job tickets.

/// Legacy media names and their PWG equivalents.
const LEGACY_NAMES: &[(&str, &str)] = &[
    ("letter", "na_letter_8.5x11in"),
    ("legal", "na_legal_8.5x14in"),
    ("executive", "na_executive_7.25x10.5in"),
    ("tabloid", "na_ledger_11x17in"),
    ("ledger", "na_ledger_11x17in"),
    ("a3", "iso_a3_297x420mm"),
    ("a4", "iso_a4_210x297mm"),
    ("a5", "iso_a5_148x210mm"),
    ("a6", "iso_a6_105x148mm"),
    ("b5", "jis_b5_182x257mm"),
    ("env10", "na_number-10_4.125x9.5in"),
    ("envdl", "iso_dl_110x220mm"),
];

/// A resolved media entry: PWG name plus physical size in PWG units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub name: String,
    /// Width in 1/2540 inch.
    pub width: u32,
    /// Height in 1/2540 inch.
    pub height: u32,
}

impl Media {
    /// Look up a media entry by PWG or legacy name.
    pub fn lookup(name: &str) -> Option<Media> {
        let pwg_name = LEGACY_NAMES
            .iter()
            .find(|(legacy, _)| name.eq_ignore_ascii_case(legacy))
            .map(|(_, pwg)| *pwg)
            .unwrap_or(name);

        let (width, height) = parse_self_describing(pwg_name)?;
        Some(Media {
            name: pwg_name.to_string(),
            width,
            height,
        })
    }

    /// Build an entry from explicit PWG-unit dimensions (`media-size`).
    pub fn from_dimensions(width: u32, height: u32) -> Media {
        let name = format!(
            "custom_{}x{}mm",
            width as f64 / 100.0,
            height as f64 / 100.0
        );
        Media {
            name,
            width,
            height,
        }
    }

    /// Page width in printer points, rounded.
    pub fn width_points(&self) -> u32 {
        pwg_to_points(self.width)
    }

    /// Page height in printer points, rounded.
    pub fn height_points(&self) -> u32 {
        pwg_to_points(self.height)
    }
}

fn pwg_to_points(units: u32) -> u32 {
    ((units as u64 * 72 + 1270) / 2540) as u32
}

/// Parse the `WxHin` / `WxHmm` tail of a PWG self-describing name.
fn parse_self_describing(name: &str) -> Option<(u32, u32)> {
    // class_name_WxHunit with at least three '_'-separated fields
    let mut parts = name.split('_');
    let _class = parts.next().filter(|s| !s.is_empty())?;
    let dims = parts.last().filter(|s| !s.is_empty())?;

    let (dims, per_unit) = if let Some(d) = dims.strip_suffix("mm") {
        (d, 100.0)
    } else if let Some(d) = dims.strip_suffix("in") {
        (d, 2540.0)
    } else {
        return None;
    };

    let (w, h) = dims.split_once('x')?;
    let w: f64 = w.parse().ok().filter(|v| *v > 0.0)?;
    let h: f64 = h.parse().ok().filter(|v| *v > 0.0)?;
    Some(((w * per_unit).round() as u32, (h * per_unit).round() as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_pwg_name() {
        let media = Media::lookup("na_letter_8.5x11in").unwrap();
        assert_eq!(media.width, 21590);
        assert_eq!(media.height, 27940);
        assert_eq!(media.width_points(), 612);
        assert_eq!(media.height_points(), 792);
    }

    #[test]
    fn test_lookup_a4() {
        let media = Media::lookup("iso_a4_210x297mm").unwrap();
        assert_eq!(media.width, 21000);
        assert_eq!(media.height, 29700);
        assert_eq!(media.width_points(), 595);
        // 29700 * 72 / 2540 = 841.9; the PCL size table keys on 842.
        assert_eq!(media.height_points(), 842);
    }

    #[test]
    fn test_lookup_legacy_alias() {
        let media = Media::lookup("letter").unwrap();
        assert_eq!(media.name, "na_letter_8.5x11in");
        assert_eq!(media.width, 21590);
    }

    #[test]
    fn test_lookup_unknown() {
        assert_eq!(Media::lookup("bogus_size"), None);
        assert_eq!(Media::lookup("na_letter_8.5x11parsec"), None);
    }

    #[test]
    fn test_from_dimensions() {
        let media = Media::from_dimensions(21000, 29700);
        assert_eq!(media.width, 21000);
        assert_eq!(media.height_points(), 842);
    }
}
