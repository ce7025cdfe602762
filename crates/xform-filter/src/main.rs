//! ipptransform: convert a PDF or JPEG document to PWG raster or HP PCL.
//!
//! Invoked per job by an IPP server. Job options arrive as `IPP_*`
//! environment variables and `-o` clauses; the raster stream goes to
//! stdout or a `socket://` device URI, and progress/log lines go to stderr
//! using the `ATTR:`/`STATE:`/`ERROR:` line protocol the server ingests.

mod jpeg;
mod logger;
mod pdf;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use xform_raster::config::{configure, parse_resolution_list, parse_type_list, JobSetup};
use xform_raster::encoder::OutputFormat;
use xform_raster::error::{Error, Result};
use xform_raster::header::SheetBack;
use xform_raster::options::Options;
use xform_raster::pipeline::run_job;
use xform_raster::progress::Reporter;
use xform_raster::sink::Sink;
use xform_raster::source::PageSource;

use crate::jpeg::JpegSource;
use crate::pdf::PdfSource;

#[derive(Parser)]
#[command(
    name = "ipptransform",
    about = "Convert PDF and JPEG files to raster data or HP PCL",
    disable_version_flag = true
)]
struct Cli {
    /// Output device URI (socket://host[:port]); stdout when omitted
    #[arg(short = 'd', value_name = "DEVICE-URI")]
    device_uri: Option<String>,

    /// Input MIME type; inferred from the filename when omitted
    #[arg(short = 'i', value_name = "CONTENT-TYPE")]
    input_type: Option<String>,

    /// Output MIME type (application/vnd.hp-pcl or image/pwg-raster)
    #[arg(short = 'm', value_name = "OUTPUT-TYPE")]
    output_type: Option<String>,

    /// Job options ("name=value ..."), repeatable
    #[arg(short = 'o', value_name = "NAME=VALUE", action = ArgAction::Append)]
    options: Vec<String>,

    /// Supported resolutions, comma-separated (e.g. 300dpi,600dpi)
    #[arg(short = 'r', value_name = "RESOLUTIONS")]
    resolutions: Option<String>,

    /// Back-side transform: normal, flipped, manual-tumble, rotated
    #[arg(short = 's', value_name = "SHEET-BACK")]
    sheet_back: Option<String>,

    /// Supported raster types, comma-separated (e.g. sgray_8,srgb_8)
    #[arg(short = 't', value_name = "TYPES")]
    types: Option<String>,

    /// Increase verbosity
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,

    /// File to transform
    filename: PathBuf,
}

/// Environment snapshot taken once at startup.
struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    fn snapshot() -> Env {
        Env {
            vars: std::env::vars().collect(),
        }
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputFormat {
    Pdf,
    Jpeg,
}

/// Resolve the input format from `-i`, `CONTENT_TYPE`, or the filename.
fn input_format(
    flag: Option<&str>,
    env: &Env,
    filename: &Path,
) -> Result<InputFormat> {
    if let Some(mime) = flag.or_else(|| env.get("CONTENT_TYPE")) {
        return match mime {
            "application/pdf" => Ok(InputFormat::Pdf),
            "image/jpeg" => Ok(InputFormat::Jpeg),
            other => Err(Error::Config(format!(
                "Unsupported input format '{other}'."
            ))),
        };
    }

    let extension = filename
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => Ok(InputFormat::Pdf),
        Some("jpg") | Some("jpeg") => Ok(InputFormat::Jpeg),
        _ => Err(Error::Config(format!(
            "Unable to determine the format of '{}'.",
            filename.display()
        ))),
    }
}

fn run(cli: &Cli, env: &Env) -> Result<()> {
    // Merge options: IPP_* environment first, -o clauses override.
    let mut options = Options::from_env_pairs(env.vars.clone());
    for clause in &cli.options {
        options.parse_clause(clause);
    }
    if let Some(uri) = cli.device_uri.as_deref().or_else(|| env.get("DEVICE_URI")) {
        options.set("device-uri", uri);
    }

    let output_type = cli
        .output_type
        .as_deref()
        .or_else(|| env.get("OUTPUT_TYPE"))
        .unwrap_or("image/pwg-raster");
    let format = OutputFormat::parse(output_type)
        .ok_or_else(|| Error::Config(format!("Unsupported output format '{output_type}'.")))?;

    let resolutions = parse_resolution_list(
        cli.resolutions
            .as_deref()
            .or_else(|| env.get("PWG_RASTER_DOCUMENT_RESOLUTION_SUPPORTED"))
            .unwrap_or("300dpi,600dpi"),
    )?;
    let types = parse_type_list(
        cli.types
            .as_deref()
            .or_else(|| env.get("PWG_RASTER_DOCUMENT_TYPE_SUPPORTED"))
            .unwrap_or("sgray_8,srgb_8"),
    )?;
    let sheet_back_keyword = cli
        .sheet_back
        .as_deref()
        .or_else(|| env.get("PWG_RASTER_DOCUMENT_SHEET_BACK"))
        .unwrap_or("normal");
    let sheet_back = SheetBack::parse(sheet_back_keyword).ok_or_else(|| {
        Error::Config(format!("Unknown \"sheet-back\" value '{sheet_back_keyword}'."))
    })?;

    let mut source: Box<dyn PageSource> =
        match input_format(cli.input_type.as_deref(), env, &cli.filename)? {
            InputFormat::Pdf => Box::new(PdfSource::open(&cli.filename)?),
            InputFormat::Jpeg => Box::new(JpegSource::open(&cli.filename)?),
        };

    // PCL output is always dithered from grayscale; only PWG carries color.
    let color = format == OutputFormat::PwgRaster
        && source.is_color()
        && options.get("print-color-mode") != Some("monochrome");
    let config = configure(&JobSetup {
        options: &options,
        resolutions: &resolutions,
        types: &types,
        sheet_back,
        pages: source.page_count(),
        color,
        media_default: env.get("PRINTER_MEDIA_DEFAULT"),
        sides_default: env.get("PRINTER_SIDES_DEFAULT"),
    })?;

    let mut sink = Sink::open(options.get("device-uri"))?;
    let mut encoder = format.encoder();
    let mut reporter = Reporter::stderr();
    run_job(
        source.as_mut(),
        encoder.as_mut(),
        &config,
        &mut sink,
        &mut reporter,
    )
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            let _ = e.print();
            process::exit(0);
        }
        Err(e) => {
            // Unknown flags and missing arguments are configuration errors.
            let _ = e.print();
            process::exit(1);
        }
    };

    let env = Env::snapshot();
    logger::init(cli.verbose, env.get("SERVER_LOGLEVEL"));

    if let Err(e) = run(&cli, &env) {
        eprintln!("ERROR: {e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(vars: &[(&str, &str)]) -> Env {
        Env {
            vars: vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_input_format_from_flag() {
        let env = env_with(&[]);
        assert_eq!(
            input_format(Some("application/pdf"), &env, Path::new("x")).unwrap(),
            InputFormat::Pdf
        );
        assert_eq!(
            input_format(Some("image/jpeg"), &env, Path::new("x")).unwrap(),
            InputFormat::Jpeg
        );
        assert!(input_format(Some("text/plain"), &env, Path::new("x")).is_err());
    }

    #[test]
    fn test_input_format_from_env() {
        let env = env_with(&[("CONTENT_TYPE", "application/pdf")]);
        assert_eq!(
            input_format(None, &env, Path::new("job.bin")).unwrap(),
            InputFormat::Pdf
        );
    }

    #[test]
    fn test_input_format_from_extension() {
        let env = env_with(&[]);
        assert_eq!(
            input_format(None, &env, Path::new("doc.PDF")).unwrap(),
            InputFormat::Pdf
        );
        assert_eq!(
            input_format(None, &env, Path::new("scan.JpG")).unwrap(),
            InputFormat::Jpeg
        );
        assert_eq!(
            input_format(None, &env, Path::new("photo.jpeg")).unwrap(),
            InputFormat::Jpeg
        );
        assert!(input_format(None, &env, Path::new("notes.txt")).is_err());
    }

    #[test]
    fn test_cli_parses_repeatable_options() {
        let cli = Cli::try_parse_from([
            "ipptransform",
            "-m",
            "application/vnd.hp-pcl",
            "-o",
            "media=na_letter_8.5x11in copies=2",
            "-o",
            "sides=two-sided-long-edge",
            "-vv",
            "job.pdf",
        ])
        .unwrap();
        assert_eq!(cli.options.len(), 2);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output_type.as_deref(), Some("application/vnd.hp-pcl"));
        assert_eq!(cli.filename, PathBuf::from("job.pdf"));
    }

    #[test]
    fn test_cli_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["ipptransform", "-x", "job.pdf"]).is_err());
        assert!(Cli::try_parse_from(["ipptransform", "-o"]).is_err());
    }
}
