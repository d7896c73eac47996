use divan::{Bencher, black_box};
use mini_ts::{parse, to_python_with};
use transkit::{RenderStrategy, TranslateConfig};

fn main() {
    divan::main();
}

const SAMPLE_STATEMENTS: &[&str] = &[
    "// Compute the total\nconst totalValue = computeTotal(items, { taxRate: 0.2, roundUp: true });",
    "if (totalValue > 100 && !isMember) {\n  applyDiscount(totalValue, 'bulk');\n} else {\n  console.log('no discount');\n}",
    "function scaleBy(factor) {\n  /* scale every entry */\n  return [factor * 2, factor * 3];\n}",
    "const config = {\n  retries: 3,\n  nested: { a: 1, b: 'two' }\n};",
];

/// A program of `count` statements separated by blank lines.
fn generate_program(count: usize) -> String {
    let mut program = String::with_capacity(count * 80);
    for i in 0..count {
        program.push_str(SAMPLE_STATEMENTS[i % SAMPLE_STATEMENTS.len()]);
        program.push_str("\n\n");
    }
    program
}

#[divan::bench(args = [10, 100, 1000])]
fn parse_only(bencher: Bencher, n: usize) {
    let program = generate_program(n);

    bencher.bench(|| black_box(parse(&program).unwrap()));
}

#[divan::bench(args = [10, 100, 1000])]
fn translate_recursive(bencher: Bencher, n: usize) {
    let program = generate_program(n);

    bencher.bench(|| black_box(to_python_with(&program, TranslateConfig::DEFAULT).unwrap()));
}

#[divan::bench(args = [10, 100, 1000])]
fn translate_work_list(bencher: Bencher, n: usize) {
    let program = generate_program(n);
    let config = TranslateConfig::new().with_render_strategy(RenderStrategy::WorkList);

    bencher.bench(|| black_box(to_python_with(&program, config).unwrap()));
}
