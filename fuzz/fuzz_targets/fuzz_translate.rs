#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use transkit::TranslateConfig;

#[derive(Debug, Arbitrary)]
struct Input {
    config: TranslateConfig,
    source: String,
}

fuzz_target!(|input: Input| {
    let config = input
        .config
        .with_max_recursion_depth(input.config.max_recursion_depth.min(256));

    // Anything that parses must translate and render.
    if let Ok(translation) = mini_ts::to_python_with(&input.source, config) {
        assert!(translation.code.lines().all(|line| !line.ends_with([' ', '\t'])));
    }
    let _ = mini_ts::visualize(&input.source);
});
