//! Resolution benchmarks over synthetic documents.
//!
//! ```bash
//! cargo bench --bench resolution
//! cargo bench --features parallel --bench resolution
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use anaphora::embedding::{EmbeddingExtractor, WordCounts, WordVectors};
use anaphora::features::DISTANCE_BUCKETS;
use anaphora::model::{LayerWeights, ModelWeights, ScoringModel};
use anaphora::scorer::PairwiseScorer;
use anaphora::{
    candidates::candidate_antecedents, CancelToken, CorefAlgorithm, CorefConfig, Document,
    Mention, MentionId, ModelBundle, NeuralCoref,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const VECTOR_DIM: usize = 50;
const HIDDEN_DIM: usize = 100;

fn dense(rows: usize, cols: usize) -> LayerWeights {
    LayerWeights {
        kernel: (0..rows)
            .map(|i| (0..cols).map(|j| ((i * 31 + j * 7) % 13) as f64 / 13.0 - 0.5).collect())
            .collect(),
        bias: vec![0.1; rows],
    }
}

fn synthetic_bundle() -> ModelBundle {
    let vocab: Vec<String> = (0..200).map(|i| format!("word{i}")).collect();
    let pair_dim = 2 * DISTANCE_BUCKETS + 1;
    let input_dim = 4 * VECTOR_DIM;

    let weights = ModelWeights {
        antecedent: dense(HIDDEN_DIM, input_dim),
        anaphor: dense(HIDDEN_DIM, input_dim),
        pair: dense(HIDDEN_DIM, pair_dim),
        na_representation: vec![0.05; HIDDEN_DIM],
        hidden: vec![dense(HIDDEN_DIM, HIDDEN_DIM), dense(1, HIDDEN_DIM)],
        mention_feature_ids: HashMap::new(),
        pair_feature_ids: HashMap::new(),
    };
    let (model, features) = ScoringModel::from_weights(&weights).unwrap();

    let vectors = WordVectors::new(
        vocab
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let v = (0..VECTOR_DIM)
                    .map(|d| ((i * 17 + d) % 7) as f64 / 7.0 - 0.5)
                    .collect();
                (w.clone(), v)
            })
            .collect(),
    )
    .unwrap();
    let counts = WordCounts::new(vocab.iter().map(|w| (w.clone(), 100u64)).collect());
    let embeddings = EmbeddingExtractor::new(vectors, counts, 10);

    ModelBundle::new(model, features, embeddings).unwrap()
}

/// `n` mentions spread over sentences of five, heads cycling through the
/// vocabulary so string matches occur at realistic rates.
fn synthetic_doc(n: usize) -> Document {
    Document::new(
        (0..n)
            .map(|i| {
                Mention::new(i as MentionId, i / 5, (i % 5) * 3, (i % 5) * 3 + 2, format!("word{}", i % 37))
            })
            .collect(),
    )
    .unwrap()
}

fn bench_scoring(c: &mut Criterion) {
    let bundle = synthetic_bundle();
    let mut group = c.benchmark_group("score_document");
    for &n in &[50usize, 200] {
        let doc = synthetic_doc(n);
        let candidates = candidate_antecedents(&doc, 50, 500);
        let scorer = PairwiseScorer::new(&bundle.model, &bundle.features, &bundle.embeddings);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                scorer
                    .score_document(black_box(&doc), &candidates, &CancelToken::new())
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_full_resolution(c: &mut Criterion) {
    let resolver = NeuralCoref::new(Arc::new(synthetic_bundle()), CorefConfig::default()).unwrap();
    let mut group = c.benchmark_group("run_coref");
    for &n in &[50usize, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_with_setup(
                || synthetic_doc(n),
                |mut doc| {
                    resolver.run_coref(&mut doc, &CancelToken::new()).unwrap();
                    black_box(doc.cluster_count())
                },
            );
        });
    }
    group.finish();
}

fn bench_candidate_generation(c: &mut Criterion) {
    let doc = synthetic_doc(500);
    c.bench_function("candidate_antecedents/500", |b| {
        b.iter(|| candidate_antecedents(black_box(&doc), 50, 500));
    });
}

criterion_group!(
    benches,
    bench_scoring,
    bench_full_resolution,
    bench_candidate_generation
);
criterion_main!(benches);
