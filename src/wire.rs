use serde_json::Value;
use tracing::warn;

/// One decoded record from the generation event stream.
///
/// The service sends `data: <json>` frames where the JSON carries exactly one
/// of the `chunk`, `final`, or `error` keys.
#[derive(Debug, Clone, PartialEq)]
pub enum WireEvent {
    /// Incremental text fragment for transient display.
    Chunk(String),
    /// Terminal payload; normalized into a `ResearchPaper`.
    Final(Value),
    /// Terminal application error reported by the service.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseFrame {
    pub data: String,
}

/// Incremental decoder for the `data: <json>\n\n` event framing.
///
/// Frames may arrive split across arbitrary chunk boundaries; bytes are
/// buffered until a blank-line delimiter completes a frame.
#[derive(Default)]
pub(crate) struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf) {
            let frame_bytes = self.buf[..idx].to_vec();
            self.buf.drain(..idx + delim_len);
            if let Some(frame) = parse_sse_frame(&frame_bytes) {
                frames.push(frame);
            }
        }
        frames
    }
}

fn find_frame_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len()
            && buf[i] == b'\r'
            && buf[i + 1] == b'\n'
            && buf[i + 2] == b'\r'
            && buf[i + 3] == b'\n'
        {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut data_lines: Vec<String> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim_start().to_string());
        }
    }
    if data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        data: data_lines.join("\n"),
    })
}

#[derive(serde::Deserialize)]
struct RawRecord {
    chunk: Option<String>,
    #[serde(rename = "final")]
    final_payload: Option<Value>,
    error: Option<String>,
}

/// Decodes one frame into a wire event.
///
/// Returns `None` for frames that are not valid events: malformed JSON and
/// records without a recognized key are logged and skipped, never fatal.
pub(crate) fn decode_frame(frame: &SseFrame) -> Option<WireEvent> {
    let data = frame.data.trim();
    if data.is_empty() {
        return None;
    }
    let record: RawRecord = match serde_json::from_str(data) {
        Ok(record) => record,
        Err(err) => {
            warn!(%err, "skipping malformed event record");
            return None;
        }
    };
    if let Some(chunk) = record.chunk {
        return Some(WireEvent::Chunk(chunk));
    }
    if let Some(payload) = record.final_payload {
        return Some(WireEvent::Final(payload));
    }
    if let Some(error) = record.error {
        return Some(WireEvent::Error(error));
    }
    warn!("skipping event record without a recognized key");
    None
}
