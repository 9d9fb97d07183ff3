#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use phasekit::baseline::{decode, encode};
use phasekit::demo::Entry;
use phasekit::Array;

fuzz_target!(|data: &[u8]| {
    let path = Path::new("fuzz.0.json");
    // Anything that decodes must re-encode, and the re-encoding must decode to the same vector
    if let Ok(vector) = decode::<Array<Entry>>(path, data) {
        let bytes = encode(path, &vector).unwrap();
        let again: Array<Entry> = decode(path, &bytes).unwrap();
        assert_eq!(again, vector);
    }
    let _ = decode::<Array<serde_json::Value>>(path, data);
});
