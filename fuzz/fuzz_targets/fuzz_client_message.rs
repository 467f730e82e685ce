#![no_main]

use libfuzzer_sys::fuzz_target;
use scorewall_client::protocol::ClientMessage;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<ClientMessage>(data);

    // Anything that decodes must also re-encode without panicking.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(message) = serde_json::from_str::<ClientMessage>(s) {
            let _ = serde_json::to_string(&message);
        }
    }
});
