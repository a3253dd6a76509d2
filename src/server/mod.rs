//! Line protocol adapter.
//!
//! Drives a [`Pipeline`] over any `BufRead`/`Write` pair, one line-delimited
//! JSON record per request and per response. The binary attaches this to
//! stdin/stdout; tests attach it to in-memory buffers, so the protocol is
//! exercised without spawning a process.
//!
//! Lifecycle: the single line `ready` precedes all responses, the single
//! line `exit` follows the stop directive (`exit` or `stop`) and trace
//! flushing. Error responses share the channel with results, distinguished
//! by the `type` tag.

use crate::error::{OnsetError, Result};
use crate::pipeline::{ChunkResult, Pipeline};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

/// Readiness line, written once construction has completed.
pub const READY_LINE: &str = "ready";

/// Exit line, written immediately before terminating.
pub const EXIT_LINE: &str = "exit";

/// One chunk-processing request. Field name matches the harness wire
/// format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRequest {
    pub raw_audio: Vec<f32>,
}

/// One response line, tagged so callers can branch on `type` without
/// heuristics on message text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    Result(ChunkResult),
    Error { code: String, message: String },
}

impl Response {
    pub fn from_error(err: &OnsetError) -> Self {
        Response::Error {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Serve requests until the stop directive or end of input.
///
/// Every accepted chunk receives exactly one response before termination;
/// the stop directive is only honored between chunks.
pub fn serve<R: BufRead, W: Write>(
    pipeline: &mut Pipeline,
    reader: R,
    writer: &mut W,
) -> Result<()> {
    writeln!(writer, "{}", READY_LINE)?;
    writer.flush()?;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "stop" {
            debug!("stop directive received");
            break;
        }

        let response = handle_line(pipeline, line);
        writeln!(writer, "{}", serde_json::to_string(&response)?)?;
        writer.flush()?;
    }

    pipeline.shutdown();
    writeln!(writer, "{}", EXIT_LINE)?;
    writer.flush()?;
    Ok(())
}

fn handle_line(pipeline: &mut Pipeline, line: &str) -> Response {
    let request: ChunkRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            let err = OnsetError::Protocol {
                reason: e.to_string(),
            };
            warn!("unparseable request line: {}", e);
            return Response::from_error(&err);
        }
    };

    match pipeline.process_chunk(&request.raw_audio) {
        Ok(result) => Response::Result(result),
        Err(err) => {
            warn!("request rejected: {}", err);
            Response::from_error(&err)
        }
    }
}
