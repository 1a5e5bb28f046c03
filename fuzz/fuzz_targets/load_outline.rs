#![no_main]

use libfuzzer_sys::fuzz_target;
use vshelf::lcc::LccTree;

fuzz_target!(|data: &[u8]| {
    if let Ok(tree) = LccTree::from_csv_reader(data) {
        let _ = tree.lookup("QA76.73 .C15");
    }
});
