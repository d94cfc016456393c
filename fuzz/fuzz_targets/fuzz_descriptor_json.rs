#![no_main]

use libfuzzer_sys::fuzz_target;
use recordquery_core::QueryDescriptor;

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = std::str::from_utf8(data) {
        if let Ok(descriptor) = QueryDescriptor::from_json(json) {
            let _ = descriptor.validate();
        }
    }
});
