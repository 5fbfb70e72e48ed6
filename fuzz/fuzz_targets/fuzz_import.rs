#![no_main]

//! State document import fuzzer.
//!
//! Any text either fails with `ConfigMalformed` or yields a session that
//! satisfies every invariant and survives a second export/import unchanged.

use fission::codec::{export_session, from_json, session_from_document};
use fission::game::invariants::check_invariants;
use fission::EngineError;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let doc = match from_json(text) {
        Ok(doc) => doc,
        Err(EngineError::ConfigMalformed(_)) => return,
        Err(e) => panic!("unexpected error kind: {e}"),
    };

    let session = session_from_document(&doc);
    let violations = check_invariants(&session);
    assert!(violations.is_empty(), "Invariants violated after import: {violations:?}");

    // A second pass must be a fixed point
    let exported = export_session(&session);
    let again = session_from_document(&exported);
    assert_eq!(export_session(&again), exported);
});
