// Throughput of the combination stages on synthetic matcher output
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use semprop::{
    CandidateSet, CandidateStreams, CoherenceGroups, Matching, MatchingType, NegativeSet,
    OntologyClass, Passthrough, Pipeline, PipelineConfig, SchemaElement,
};
use semprop_engine::{cancel, combine_sets, filter_attribute_level};
use std::sync::Arc;

const TABLES: usize = 200;
const ATTRIBUTES: usize = 20;
const CLASSES: usize = 500;

fn random_matching(rng: &mut impl Rng, table_level: bool) -> Matching {
    let table = format!("table_{}", rng.random_range(0..TABLES));
    let element = if table_level {
        SchemaElement::table("chembl", &table)
    } else {
        SchemaElement::new("chembl", &table, &format!("attr_{}", rng.random_range(0..ATTRIBUTES)))
    };
    let class = OntologyClass::new("efo", &format!("Class_{}", rng.random_range(0..CLASSES)));
    Matching::new(element, class)
}

fn random_stream(size: usize, table_level: bool) -> Vec<Matching> {
    let mut rng = rand::rng();
    (0..size).map(|_| random_matching(&mut rng, table_level)).collect()
}

fn random_streams(size: usize) -> CandidateStreams {
    let l6 = random_stream(size / 4, true);
    let groups = CoherenceGroups::from_matchings(&l6);
    let stream = |t: MatchingType, table_level: bool| {
        CandidateSet::new(t, random_stream(size, table_level))
    };
    let negatives = |t: MatchingType, table_level: bool| {
        NegativeSet::new(t, random_stream(size / 2, table_level)).expect("semantic stream")
    };

    CandidateStreams::new()
        .with_candidates(stream(MatchingType::L4ClassNameRelationNameSyn, true))
        .with_candidates(stream(MatchingType::L5ClassNameAttrNameSyn, false))
        .with_candidates(stream(MatchingType::L42ClassNameRelationNameSem, true))
        .with_candidates(stream(MatchingType::L52ClassNameAttrNameSem, false))
        .with_candidates(CandidateSet::new(MatchingType::L6ClassNameRelationSemCoherence, l6))
        .with_candidates(stream(MatchingType::L7ClassNameAttrNameFuzzy, false))
        .with_negatives(negatives(MatchingType::L42ClassNameRelationNameSem, true))
        .with_negatives(negatives(MatchingType::L52ClassNameAttrNameSem, false))
        .with_coherence_groups(groups)
}

fn benchmark_cancel(c: &mut Criterion) {
    let mut group = c.benchmark_group("cancel");

    for size in [1_000, 10_000, 100_000].iter() {
        let positive = random_stream(*size, true);
        let negative = random_stream(*size / 2, true);
        group.bench_with_input(BenchmarkId::new("negative_pairs", size), size, |b, _| {
            b.iter(|| cancel(black_box(&positive), black_box(&negative)));
        });
    }

    group.finish();
}

fn benchmark_coherence(c: &mut Criterion) {
    let mut group = c.benchmark_group("coherence");

    for size in [1_000, 10_000, 100_000].iter() {
        let candidates = random_stream(*size, false);
        let groups = CoherenceGroups::from_matchings(&random_stream(*size / 4, true));
        group.bench_with_input(BenchmarkId::new("attribute_level", size), size, |b, _| {
            b.iter(|| filter_attribute_level(black_box(&candidates), black_box(&groups)));
        });
    }

    group.finish();
}

fn benchmark_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine");

    for size in [1_000, 10_000, 100_000].iter() {
        let streams = random_streams(*size);
        let types = PipelineConfig::default().combine_types;
        group.bench_with_input(BenchmarkId::new("provenance", size), size, |b, _| {
            b.iter(|| combine_sets(types.iter().map(|t| streams.stream(*t))).len());
        });
    }

    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(Passthrough))
        .expect("default config is valid");
    for size in [1_000, 10_000].iter() {
        let streams = random_streams(*size);
        group.bench_with_input(BenchmarkId::new("full_run", size), size, |b, _| {
            b.iter(|| pipeline.run(black_box(streams.clone())).matchings().len());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_cancel,
    benchmark_coherence,
    benchmark_combine,
    benchmark_pipeline
);
criterion_main!(benches);
