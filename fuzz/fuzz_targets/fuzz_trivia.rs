#![no_main]

use libfuzzer_sys::fuzz_target;
use transkit::trivia::{count_naked_newlines, next_line_start, scan, skip_trivia, TriviaKind};

fuzz_target!(|data: &str| {
    // Bounded scans cover the range exactly, in order.
    let spans = scan(data, 0, Some(data.len()));
    let mut pos = 0;
    for span in &spans {
        assert_eq!(span.start, pos);
        assert!(span.end > span.start);
        assert!(data.is_char_boundary(span.start) && data.is_char_boundary(span.end));
        pos = match span.kind {
            TriviaKind::LineComment if span.has_trailing_blank_line => {
                let rest = &data[span.end..];
                span.end + if rest.starts_with("\r\n") { 2 } else { 1 }
            }
            _ => span.end,
        };
    }
    assert_eq!(pos, data.len());

    // Leading scans stop at the first token.
    let token = skip_trivia(data, 0);
    assert!(token <= data.len());
    if let Some(last) = scan(data, 0, None).last() {
        assert!(last.end <= token);
    }

    assert!(count_naked_newlines(data) <= data.matches('\n').count());
    assert!(next_line_start(data, 0, data.len()) <= data.len());
});
