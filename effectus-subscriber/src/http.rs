//! Serializes an event as JSON and POSTs it to a fixed URL (§4.2 "HTTP POST
//! sink"). The wire format beyond "POST a serialized event" is explicitly
//! out of scope (§1); §4.4 of the expanded spec fixes the minimum needed
//! for a working sink, grounded on `adamtc007-ob-poc`'s use of `reqwest`
//! with `rustls-tls`.

use effectus_core::{Logger, LoggingEvent};
use reqwest::blocking::Client;
use reqwest::Url;

/// POSTs each event's JSON encoding (see
/// [`effectus_core::LoggingEvent::to_json`]) to a fixed URL. Failures are
/// reported to standard error and do not propagate, matching §7's rule
/// that logger I/O errors from sinks do not propagate to the supervisor.
/// `close()` is a no-op per §4.2.
pub struct HttpLogger {
    client: Client,
    url: Url,
}

impl std::fmt::Debug for HttpLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLogger").field("url", &self.url).finish()
    }
}

impl HttpLogger {
    pub fn new(url: Url) -> Self {
        HttpLogger {
            client: Client::new(),
            url,
        }
    }
}

impl Logger for HttpLogger {
    fn log(&self, event: &LoggingEvent) {
        let body = match event.to_json() {
            Ok(body) => body,
            Err(e) => {
                eprintln!("effectus: failed to encode event for HTTP sink: {e}");
                return;
            }
        };
        if let Err(e) = self
            .client
            .post(self.url.clone())
            .header("content-type", "application/json")
            .body(body)
            .send()
        {
            eprintln!("effectus: HTTP sink POST failed: {e}");
        }
    }

    fn close(&self) -> std::io::Result<()> {
        Ok(())
    }
}
