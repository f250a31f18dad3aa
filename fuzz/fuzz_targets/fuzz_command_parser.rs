//! Fuzz target: command link parser
//!
//! Feeds arbitrary bytes (lossily decoded as UTF-8) into
//! `AppCommand::parse` and verifies:
//! - No panics on any input, including multi-byte characters at the
//!   overlay truncation boundary
//! - A `MSG:` body never exceeds `MAX_OVERLAY_CHARS` bytes
//! - `PAGE:` only ever yields an index that round-trips through `parse`
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use cluster::app::commands::AppCommand;
use cluster::display::overlay::MAX_OVERLAY_CHARS;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);
    match AppCommand::parse(&line) {
        Ok(AppCommand::Message(text)) => {
            assert!(text.len() <= MAX_OVERLAY_CHARS);
        }
        Ok(AppCommand::ShowPage(index)) => {
            let again = AppCommand::parse(&format!("PAGE:{index}"));
            assert_eq!(again, Ok(AppCommand::ShowPage(index)));
        }
        _ => {}
    }
});
