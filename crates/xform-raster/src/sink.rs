//! Output byte sink.
//!
//! The raster stream goes to inherited stdout unless the job carries a
//! `device-uri`, which must then be `socket://host[:port]` — a raw-print
//! TCP connection. All writes ride through a short-write/interrupt retry
//! loop; any other write error is fatal to the job.

use std::io::{self, ErrorKind, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Total connect budget for `socket://` sinks.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default raw-print port.
const DEFAULT_PORT: u16 = 9100;

pub struct Sink {
    writer: Box<dyn Write + Send>,
}

impl Sink {
    /// Sink for the inherited standard output.
    pub fn stdout() -> Sink {
        Sink {
            writer: Box::new(io::stdout()),
        }
    }

    /// Sink over an arbitrary writer (tests, files).
    pub fn from_writer(writer: Box<dyn Write + Send>) -> Sink {
        Sink { writer }
    }

    /// Open a sink for an optional device URI.
    pub fn open(device_uri: Option<&str>) -> Result<Sink> {
        match device_uri {
            None => Ok(Sink::stdout()),
            Some(uri) => Sink::connect(uri),
        }
    }

    /// Connect a `socket://host[:port]` device URI.
    pub fn connect(device_uri: &str) -> Result<Sink> {
        let Some(authority) = device_uri.strip_prefix("socket://") else {
            return Err(Error::Config(format!(
                "Unsupported device URI scheme in '{device_uri}'."
            )));
        };
        let authority = authority.trim_end_matches('/');
        let target = if split_port(authority).is_some() {
            authority.to_string()
        } else {
            format!("{authority}:{DEFAULT_PORT}")
        };

        let deadline = Instant::now() + CONNECT_TIMEOUT;
        let addrs = target
            .to_socket_addrs()
            .map_err(|e| Error::Config(format!("Unable to resolve '{target}': {e}")))?;

        let mut last_error: Option<io::Error> = None;
        for addr in addrs {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            log::debug!("Sink::connect: trying {addr}");
            match TcpStream::connect_timeout(&addr, remaining) {
                Ok(stream) => {
                    log::info!("Sink::connect: connected to {addr}");
                    return Ok(Sink {
                        writer: Box::new(stream),
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(Error::Config(match last_error {
            Some(e) => format!("Unable to connect to '{target}': {e}"),
            None => format!("Unable to connect to '{target}'."),
        }))
    }
}

/// `host:port` split that leaves bare IPv6 literals alone.
fn split_port(authority: &str) -> Option<(&str, u16)> {
    if let Some(rest) = authority.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        let port = tail.strip_prefix(':')?.parse().ok()?;
        return Some((host, port));
    }
    if authority.matches(':').count() == 1 {
        let (host, port) = authority.split_once(':')?;
        return Some((host, port.parse().ok()?));
    }
    None
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            match self.writer.write(buf) {
                Ok(n) => return Ok(n),
                Err(e)
                    if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) =>
                {
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_other_schemes() {
        assert!(Sink::connect("ipp://printer.local/ipp/print").is_err());
        assert!(Sink::connect("file:///tmp/out").is_err());
    }

    #[test]
    fn test_split_port() {
        assert_eq!(split_port("host:9100"), Some(("host", 9100)));
        assert_eq!(split_port("host"), None);
        assert_eq!(split_port("[::1]:631"), Some(("::1", 631)));
        assert_eq!(split_port("::1"), None);
    }

    #[test]
    fn test_buffer_sink_writes() {
        let mut sink = Sink::from_writer(Box::new(Vec::new()));
        sink.write_all(b"\x1bE").unwrap();
        sink.flush().unwrap();
    }
}
