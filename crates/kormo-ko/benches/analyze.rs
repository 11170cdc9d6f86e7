// Criterion benchmarks over the bundled test resources.
//
// Run: cargo bench -p kormo-ko

use std::path::PathBuf;

use criterion::{Criterion, criterion_group, criterion_main};

use kormo_core::morpheme::Sentence;
use kormo_ko::handle::{AnalyzerOptions, KoreanAnalyzer};

fn analyzer() -> KoreanAnalyzer {
    let data_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data");
    KoreanAnalyzer::initialize(&data_dir, "kormo.cfg", AnalyzerOptions::default())
        .expect("bench resources should load")
}

// A mix of dictionary-only, rule-expanded, foreign and unknown eojeols.
const EOJEOLS: &[&str] = &[
    "먹었다", "갔다", "가니", "갑니다", "했다", "들어", "고마워", "흘러", "내가", "밥을",
    "10원", "3.14", "쿼츠", "하지만", "김치가",
];

fn bench_analyze_eojeols(c: &mut Criterion) {
    let mut analyzer = analyzer();
    c.bench_function("analyze_eojeols", |b| {
        b.iter(|| {
            for eojeol in EOJEOLS {
                std::hint::black_box(analyzer.analyze_eojeol(eojeol).unwrap());
            }
        })
    });
}

fn bench_analyze_sentence(c: &mut Criterion) {
    let mut analyzer = analyzer();
    let sentence = Sentence {
        eojeols: vec!["내가".to_string(), "밥을".to_string(), "먹었다".to_string()],
        document_id: 0,
        sentence_id: 0,
        end_of_document: false,
    };
    c.bench_function("analyze_sentence", |b| {
        b.iter(|| std::hint::black_box(analyzer.analyze(&sentence)))
    });
}

fn bench_initialize(c: &mut Criterion) {
    c.bench_function("initialize", |b| b.iter(|| std::hint::black_box(analyzer())));
}

criterion_group!(
    benches,
    bench_analyze_eojeols,
    bench_analyze_sentence,
    bench_initialize
);
criterion_main!(benches);
