use criterion::{Criterion, black_box, criterion_group, criterion_main};

use earley_drill::chart::builder::{ChartBuilder, tokenize};
use earley_drill::chart::notation;
use earley_drill::grammar::loader;

fn bench_build(c: &mut Criterion) {
    let grammar = loader::load_bundled("english").unwrap();
    let builder = ChartBuilder::new(&grammar);

    let short = tokenize("i can write a book");
    c.bench_function("build chart (5 words)", |b| {
        b.iter(|| builder.build(black_box(&short)))
    });

    // Adjective chains keep NP3 predictions alive in every set.
    let long = tokenize(
        "they can write a new old young lazy brown book in the old round room over the new house",
    );
    c.bench_function("build chart (18 words)", |b| {
        b.iter(|| builder.build(black_box(&long)))
    });
}

fn bench_notation(c: &mut Criterion) {
    let grammar = loader::load_bundled("english").unwrap();
    let chart = ChartBuilder::new(&grammar).build_sentence("i can write a book");
    let rendered: Vec<String> = chart
        .sets()
        .iter()
        .flat_map(|set| set.iter().map(|item| notation::render(item, &grammar)))
        .collect();
    let typed: Vec<String> = rendered
        .iter()
        .map(|text| text.replace('→', "->").to_lowercase())
        .collect();

    c.bench_function("render every item", |b| {
        b.iter(|| {
            chart
                .sets()
                .iter()
                .flat_map(|set| set.iter())
                .map(|item| notation::render(black_box(item), &grammar))
                .count()
        })
    });

    c.bench_function("match typed items", |b| {
        b.iter(|| {
            typed
                .iter()
                .zip(&rendered)
                .filter(|(t, r)| notation::matches(black_box(t), r))
                .count()
        })
    });
}

criterion_group!(benches, bench_build, bench_notation);
criterion_main!(benches);
