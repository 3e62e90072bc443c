#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Frames arrive as text; anything that is not UTF-8 never reaches the
    // classifier.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = dumb_api_client::protocol::parse_frame(text);
    }

    // Record decoding on its own, including serde_json's UTF-8 handling.
    let _ = serde_json::from_slice::<dumb_api_client::models::Message>(data);
    let _ = serde_json::from_slice::<dumb_api_client::models::WebRtcMessage>(data);
});
