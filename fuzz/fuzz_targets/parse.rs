#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(value) = jsontext::from_str(text) else {
        return;
    };
    let serialized = value.serialize();
    let reparsed = jsontext::from_str(&serialized).expect("serialized output must parse");
    assert_eq!(reparsed, value);
});
