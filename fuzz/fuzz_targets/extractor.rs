#![no_main]

use libfuzzer_sys::fuzz_target;

use game_record::extractor::{assisted, heuristic};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Neither parser may panic, whatever the page or model sends back
    let _ = heuristic::extract(&text).into_record("https://www.ign.com/games/fuzz");
    let _ = assisted::parse_answer(&text);
});
