//! Tracing setup for the `braid` binary.
//!
//! `RUST_LOG` sets the filter (default `info`). With `LOG_FILE` set, events are
//! appended to that file as plain text. Otherwise they go to stderr when
//! `--verbose` is given and are dropped when it is not, so stdout carries only
//! command output.

use std::io::Write;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const ENV_LOG_FILE: &str = "LOG_FILE";

fn filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "braid=debug,info" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = filter(verbose);

    if let Ok(path) = std::env::var(ENV_LOG_FILE) {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(StripAnsi::new(file)))
            .with_ansi(false)
            .with_filter(filter);
        tracing_subscriber::registry().with(layer).try_init()?;
        tracing::debug!(path = %path, "logging to file");
    } else if verbose {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(filter);
        tracing_subscriber::registry().with(layer).try_init()?;
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::sink)
            .with_filter(filter);
        tracing_subscriber::registry().with(layer).try_init()?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    Text,
    /// Saw ESC.
    Start,
    /// Inside `ESC [ ...` until a final byte.
    Csi,
}

/// Drops CSI escape sequences (colors, cursor moves) from everything written.
struct StripAnsi<W> {
    inner: W,
    state: Escape,
}

impl<W: Write> StripAnsi<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            state: Escape::Text,
        }
    }
}

impl<W: Write> Write for StripAnsi<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut plain = Vec::with_capacity(buf.len());
        for &b in buf {
            self.state = match (self.state, b) {
                (Escape::Text, 0x1b) => Escape::Start,
                (Escape::Text, _) => {
                    plain.push(b);
                    Escape::Text
                }
                (Escape::Start, b'[') => Escape::Csi,
                // Lone ESC: keep both bytes.
                (Escape::Start, _) => {
                    plain.extend_from_slice(&[0x1b, b]);
                    Escape::Text
                }
                (Escape::Csi, 0x40..=0x7e) => Escape::Text,
                (Escape::Csi, _) => Escape::Csi,
            };
        }
        self.inner.write_all(&plain)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
