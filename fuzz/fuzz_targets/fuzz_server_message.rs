#![no_main]

use libfuzzer_sys::fuzz_target;
use scorewall_client::protocol::ServerMessage;
use scorewall_client::session::SessionState;

fuzz_target!(|data: &[u8]| {
    // Exercise the raw-byte deserialization path (includes serde_json's
    // own UTF-8 validation and error handling for invalid sequences).
    let _ = serde_json::from_slice::<ServerMessage>(data);

    // Also exercise the str-based path for valid UTF-8 input.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(message) = serde_json::from_str::<ServerMessage>(s) {
            // Feed whatever decoded through the session state machine
            // and the leaderboard aggregation.
            let mut session = SessionState::new();
            let _ = session.apply(message);
        }
    }
});
