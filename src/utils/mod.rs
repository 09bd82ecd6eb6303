use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch, for session timestamps.
pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[doc(hidden)]
pub mod test_support {
    /// Sandboxed CI may forbid binding localhost; httpmock tests bail out
    /// instead of failing there.
    pub fn should_skip_httpmock() -> bool {
        match std::net::TcpListener::bind(("127.0.0.1", 0)) {
            Ok(listener) => {
                drop(listener);
                false
            }
            Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                eprintln!("skipping httpmock test: sandbox forbids binding to localhost");
                true
            }
            Err(err) => panic!("failed to bind localhost for httpmock tests: {err}"),
        }
    }
}
