//! Message filters applied around every SOAP exchange.
//!
//! A filter sees each outgoing envelope before it is sent and may rewrite
//! each raw reply before it is parsed. Filters run in the order they were
//! given to [`OcwsClient::create_client`](crate::client::OcwsClient::create_client).

/// Hook into the raw messages of a client.
pub trait MessageFilter: Send + Sync {
    /// Called with the complete envelope just before it is POSTed.
    fn sending(&self, _envelope: &str) {}

    /// Called with the raw reply body; returns the body to parse.
    fn received(&self, reply: Vec<u8>) -> Vec<u8> {
        reply
    }
}

// ─── Multipart trimming ─────────────────────────────────────────────────

const ENVELOPE_OPEN: &[u8] = b"<SOAP-ENV:Envelope";
const ENVELOPE_CLOSE: &[u8] = b"</SOAP-ENV:Envelope>";

/// Locate the SOAP envelope inside a multipart reply.
///
/// Returns the bytes from the first `<SOAP-ENV:Envelope` up to and
/// including the last `</SOAP-ENV:Envelope>`, or `None` if either marker is
/// missing.
pub fn trim_multipart_reply(reply: &[u8]) -> Option<&[u8]> {
    let start = find(reply, ENVELOPE_OPEN)?;
    let end = rfind(reply, ENVELOPE_CLOSE)? + ENVELOPE_CLOSE.len();
    (end > start).then(|| &reply[start..end])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Cuts MIME multipart framing off replies so they parse as plain XML.
///
/// Some OpenClinica operations answer with `multipart/related` bodies.
/// Replies without envelope markers pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimMultipartReply;

impl MessageFilter for TrimMultipartReply {
    fn received(&self, reply: Vec<u8>) -> Vec<u8> {
        match trim_multipart_reply(&reply) {
            Some(envelope) if envelope.len() == reply.len() => reply,
            Some(envelope) => envelope.to_vec(),
            None => {
                tracing::warn!(bytes = reply.len(), "No SOAP envelope found in response");
                reply
            }
        }
    }
}

// ─── Message logging ────────────────────────────────────────────────────

/// Logs every envelope and reply at `debug` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMessages;

impl MessageFilter for LogMessages {
    fn sending(&self, envelope: &str) {
        tracing::debug!(envelope, "Sending SOAP envelope");
    }

    fn received(&self, reply: Vec<u8>) -> Vec<u8> {
        tracing::debug!(reply = %String::from_utf8_lossy(&reply), "Received SOAP reply");
        reply
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// In-memory sink for formatted log lines.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, captured.text())
    }

    const MULTIPART: &str = "------=_Part_1\r\n\
Content-Type: application/xop+xml; charset=utf-8; type=\"text/xml\"\r\n\r\n\
<SOAP-ENV:Envelope xmlns:SOAP-ENV=\"http://schemas.xmlsoap.org/soap/envelope/\">\n\
<SOAP-ENV:Body><r>ok</r></SOAP-ENV:Body>\n\
</SOAP-ENV:Envelope>\r\n------=_Part_1--\r\n";

    #[test]
    fn test_trim_extracts_envelope_across_lines() {
        let trimmed = trim_multipart_reply(MULTIPART.as_bytes()).unwrap();
        let text = std::str::from_utf8(trimmed).unwrap();
        assert!(text.starts_with("<SOAP-ENV:Envelope"));
        assert!(text.ends_with("</SOAP-ENV:Envelope>"));
        assert!(text.contains("<r>ok</r>"));
    }

    #[test]
    fn test_trim_is_greedy() {
        let reply = b"x<SOAP-ENV:Envelope>a</SOAP-ENV:Envelope>mid</SOAP-ENV:Envelope>y";
        let trimmed = trim_multipart_reply(reply).unwrap();
        assert_eq!(
            trimmed,
            b"<SOAP-ENV:Envelope>a</SOAP-ENV:Envelope>mid</SOAP-ENV:Envelope>"
        );
    }

    #[test]
    fn test_trim_without_markers() {
        assert!(trim_multipart_reply(b"<soap:Envelope/>").is_none());
        assert!(trim_multipart_reply(b"</SOAP-ENV:Envelope><SOAP-ENV:Envelope").is_none());
        assert!(trim_multipart_reply(b"").is_none());
    }

    #[test]
    fn test_filter_passes_unmatched_reply_through() {
        let reply = b"<soap:Envelope/>".to_vec();
        assert_eq!(TrimMultipartReply.received(reply.clone()), reply);
    }

    #[test]
    fn test_filter_warns_when_no_envelope_found() {
        let reply = b"<soap:Envelope/>".to_vec();
        let (out, logs) = with_captured_logs(|| TrimMultipartReply.received(reply.clone()));

        assert_eq!(out, reply);
        let line = logs
            .lines()
            .find(|l| l.contains("No SOAP envelope found in response"))
            .expect("warning was not logged");
        assert!(line.contains("WARN"), "unexpected level: {line}");
    }

    #[test]
    fn test_filter_is_silent_when_envelope_found() {
        let (out, logs) =
            with_captured_logs(|| TrimMultipartReply.received(MULTIPART.as_bytes().to_vec()));

        assert!(out.starts_with(b"<SOAP-ENV:Envelope"));
        assert!(logs.is_empty(), "unexpected log output: {logs}");
    }

    #[test]
    fn test_log_messages_logs_both_directions() {
        let ((), logs) = with_captured_logs(|| {
            LogMessages.sending("<e/>");
            LogMessages.received(b"<a/>".to_vec());
        });

        assert!(logs.contains("Sending SOAP envelope"));
        assert!(logs.contains("Received SOAP reply"));
        assert!(logs.contains("DEBUG"));
    }

    #[test]
    fn test_filter_trims_multipart() {
        let out = TrimMultipartReply.received(MULTIPART.as_bytes().to_vec());
        assert!(out.starts_with(b"<SOAP-ENV:Envelope"));
        assert!(out.ends_with(b"</SOAP-ENV:Envelope>"));
    }

    #[test]
    fn test_log_messages_is_transparent() {
        let reply = b"<a/>".to_vec();
        LogMessages.sending("<e/>");
        assert_eq!(LogMessages.received(reply.clone()), reply);
    }
}
