#![no_main]

use libfuzzer_sys::fuzz_target;
use vshelf::range_display::minimal_distinguishing_pair;
use vshelf::CallNumber;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (a, b) = text.split_once('\n').unwrap_or((text, ""));

    let first = CallNumber::new(a);
    let second = CallNumber::new(b);
    assert!(first.reverse_shelfkey().ends_with('~'));
    assert_eq!(
        first.shelfkey().cmp(second.shelfkey()),
        second.reverse_shelfkey().cmp(first.reverse_shelfkey())
    );
    let _ = minimal_distinguishing_pair(a, b);
});
