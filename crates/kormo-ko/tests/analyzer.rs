//! End-to-end tests over the bundled resource set.
//!
//! The resources under tests/data/ are a deliberately small grammar:
//! enough tags, dictionary stems and connections to exercise every
//! analysis path (plain dictionary walks, each phonological rule family,
//! foreign/number runs, the pre-analyzed cache and the user dictionary).
//! Expected analyses live in tests/golden/analyses.json.

use std::path::PathBuf;

use serde::Deserialize;

use kormo_core::morpheme::{Candidate, Sentence};
use kormo_ko::handle::{AnalyzerOptions, KoreanAnalyzer};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

fn analyzer_with(options: AnalyzerOptions) -> KoreanAnalyzer {
    KoreanAnalyzer::initialize(&data_dir(), "kormo.cfg", options)
        .expect("test resources should load")
}

fn analyzer() -> KoreanAnalyzer {
    analyzer_with(AnalyzerOptions::default())
}

#[derive(Debug, Deserialize)]
struct GoldenCase {
    surface: String,
    /// Flattened analyses that must be among the candidates.
    expected: Vec<String>,
    /// When set, the candidates must be exactly `expected`.
    #[serde(default)]
    only: bool,
}

fn load_golden() -> Vec<GoldenCase> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/golden/analyses.json");
    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&contents)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

fn flats(analyzer: &KoreanAnalyzer, candidates: &[Candidate]) -> Vec<String> {
    candidates
        .iter()
        .map(|candidate| {
            candidate
                .iter()
                .map(|m| format!("{}/{}", m.surface, analyzer.tags().name(m.tag)))
                .collect::<Vec<_>>()
                .join("+")
        })
        .collect()
}

#[test]
fn golden_analyses() {
    let mut analyzer = analyzer();
    for case in load_golden() {
        let found = analyzer
            .analyze_eojeol(&case.surface)
            .unwrap_or_else(|e| panic!("{}: {e}", case.surface));
        let found = flats(&analyzer, &found);
        for expected in &case.expected {
            assert!(
                found.contains(expected),
                "{}: expected {expected} among {found:?}",
                case.surface
            );
        }
        if case.only {
            assert_eq!(
                found.len(),
                case.expected.len(),
                "{}: expected exactly {:?}, got {found:?}",
                case.surface,
                case.expected
            );
        }
    }
}

#[test]
fn every_eojeol_yields_a_candidate() {
    let mut analyzer = analyzer();
    let inputs = ["먹었다", "쿼츠", "ABC123", "값12%만", "ㅋㅋㅋ", "..."];
    for input in inputs {
        let found = analyzer.analyze_eojeol(input).unwrap();
        assert!(!found.is_empty(), "{input}");
    }
}

#[test]
fn analysis_is_deterministic() {
    let mut analyzer = analyzer();
    for case in load_golden() {
        let first = analyzer.analyze_eojeol(&case.surface).unwrap();
        let second = analyzer.analyze_eojeol(&case.surface).unwrap();
        assert_eq!(first, second, "{}", case.surface);
    }
}

#[test]
fn candidate_cap_is_configurable() {
    let mut options = AnalyzerOptions::default();
    options.max_candidates = 1;
    let mut analyzer = analyzer_with(options);
    let found = analyzer.analyze_eojeol("들어").unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn sentence_analysis() {
    let mut analyzer = analyzer();
    let sentence = Sentence {
        eojeols: vec!["내가".to_string(), "밥을".to_string(), "먹었다".to_string()],
        document_id: 11,
        sentence_id: 2,
        end_of_document: true,
    };
    let analysis = analyzer.analyze(&sentence);
    assert_eq!(analysis.document_id, 11);
    assert_eq!(analysis.sentence_id, 2);
    assert!(analysis.end_of_document);
    assert_eq!(analysis.eojeols.len(), 3);
    for (eojeol, surface) in analysis.eojeols.iter().zip(&sentence.eojeols) {
        assert_eq!(&eojeol.surface, surface);
        assert!(!eojeol.candidates.is_empty(), "{surface}");
    }
    let last = flats(&analyzer, &analysis.eojeols[2].candidates);
    assert!(last.contains(&"먹/VV+었/EP+다/EF".to_string()), "{last:?}");
}

#[test]
fn missing_resources_fail_initialization() {
    let err = KoreanAnalyzer::initialize(
        &data_dir().join("nonexistent"),
        "kormo.cfg",
        AnalyzerOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, kormo_ko::LoadError::Io { .. }));
}
