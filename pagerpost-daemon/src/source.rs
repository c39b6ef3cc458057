//! Line-oriented CLEF event source.
//!
//! Reads from a file or stdin, decodes each non-blank line with
//! [`clef::parse_line`](crate::clef::parse_line), and feeds the reactor
//! host's channel. Malformed lines are logged and skipped.

use std::path::Path;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use pagerpost_core::event::LogEvent;
use pagerpost_core::metrics as m;

use crate::clef;

/// Input path meaning standard input.
pub const STDIN: &str = "-";

/// Counters for one source run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Lines read, blank ones included.
    pub lines: u64,
    /// Events handed to the host.
    pub events: u64,
    /// Malformed lines that were skipped.
    pub skipped: u64,
}

/// Opens the configured input as a buffered async reader.
pub async fn open_input(input: &str) -> Result<Box<dyn AsyncBufRead + Send + Unpin>> {
    if input == STDIN {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let path = Path::new(input);
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to open input '{}': {}", path.display(), e))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Pumps events from `reader` into `tx` until EOF.
///
/// Lines that are not valid UTF-8 or not valid CLEF are skipped. Stops
/// early, without error, when the receiving side has gone away.
pub async fn pump<R>(mut reader: R, tx: &mpsc::Sender<LogEvent>) -> Result<SourceStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = SourceStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        stats.lines += 1;
        metrics::counter!(m::SOURCE_LINES_READ_TOTAL).increment(1);

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                stats.skipped += 1;
                metrics::counter!(m::SOURCE_PARSE_ERRORS_TOTAL).increment(1);
                warn!(line = stats.lines, error = %e, "skipping line that is not valid UTF-8");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        match clef::parse_line(line) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    warn!("event channel closed, stopping input");
                    break;
                }
                stats.events += 1;
            }
            Err(e) => {
                stats.skipped += 1;
                metrics::counter!(m::SOURCE_PARSE_ERRORS_TOTAL).increment(1);
                warn!(line = stats.lines, error = %format!("{e:#}"), "skipping malformed CLEF line");
            }
        }
    }

    debug!(
        lines = stats.lines,
        events = stats.events,
        skipped = stats.skipped,
        "input exhausted"
    );
    Ok(stats)
}
