//! Incremental decoder for the generation event stream.
//!
//! The server streams newline-delimited records framed as `data: <json>`,
//! closed by the literal sentinel `data: [DONE]`. The decoder is pushed raw
//! byte chunks as they arrive and emits zero or more decoded events per
//! chunk. It never reads from or drives the transport.

use crate::types::ServerEvent;

const RECORD_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// Push-based line decoder with a pending partial-line buffer.
///
/// Create one per stream. The buffer holds whatever trails the last line
/// terminator, so records split across chunk boundaries reassemble
/// correctly. The decoder is not resumable after a transport error; the
/// owning attempt starts a fresh one.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    malformed: usize,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one chunk and return the events completed by it.
    ///
    /// Malformed records are dropped with a warning; one bad record never
    /// aborts the stream.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ServerEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some(record) = line.strip_prefix(RECORD_PREFIX) else {
                continue;
            };
            let record = record.trim();
            if record == DONE_SENTINEL {
                continue;
            }

            match serde_json::from_str::<ServerEvent>(record) {
                Ok(event) => events.push(event),
                Err(e) => {
                    self.malformed += 1;
                    tracing::warn!(
                        error = %e,
                        raw_record = %record,
                        "Dropping malformed stream record",
                    );
                }
            }
        }
        events
    }

    /// Count of records dropped as malformed so far.
    pub fn malformed_records(&self) -> usize {
        self.malformed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_chunks_emit_two_progress_events() {
        let mut decoder = StreamDecoder::new();

        let first = decoder.push(b"data: {\"progress\":10}\n");
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].progress, Some(10.0));

        let second = decoder.push(b"data: {\"progress\":55}\ndata: [DONE]\n");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].progress, Some(55.0));
    }

    #[test]
    fn test_record_split_across_chunks_decodes_once() {
        let mut decoder = StreamDecoder::new();

        let first = decoder.push(b"data: {\"sta");
        assert!(first.is_empty());

        let second = decoder.push(b"tus\":\"succeeded\",\"results\":[{\"url\":\"https://x/1.png\"}]}\n");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].status.as_deref(), Some("succeeded"));
        assert_eq!(decoder.malformed_records(), 0);
    }

    #[test]
    fn test_done_sentinel_is_not_parsed() {
        let mut decoder = StreamDecoder::new();
        let events = decoder.push(b"data: [DONE]\n");
        assert!(events.is_empty());
        assert_eq!(decoder.malformed_records(), 0);
    }

    #[test]
    fn test_malformed_record_dropped_stream_continues() {
        let mut decoder = StreamDecoder::new();
        let events = decoder.push(b"data: {broken\ndata: {\"progress\":80}\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].progress, Some(80.0));
        assert_eq!(decoder.malformed_records(), 1);
    }

    #[test]
    fn test_non_record_lines_ignored() {
        let mut decoder = StreamDecoder::new();
        let events = decoder.push(b"\n: keepalive\nevent: ping\ndata: {\"id\":\"j1\"}\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id.as_deref(), Some("j1"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = StreamDecoder::new();
        let events = decoder.push(b"data: {\"progress\":30}\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].progress, Some(30.0));
    }

    #[test]
    fn test_trailing_fragment_held_until_newline() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.push(b"data: {\"progress\":99}").is_empty());
        let events = decoder.push(b"\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].progress, Some(99.0));
    }

    #[test]
    fn test_co_occurring_facets_survive_decoding() {
        let mut decoder = StreamDecoder::new();
        let events = decoder.push(b"data: {\"id\":\"j7\",\"progress\":15}\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id.as_deref(), Some("j7"));
        assert_eq!(events[0].progress, Some(15.0));
    }
}
