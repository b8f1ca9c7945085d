//! Ingestion and retrieval benchmarks
//!
//! Measures performance of:
//! - Character chunking of page text
//! - Content hashing
//! - Brute-force vs HNSW nearest-neighbour ranking

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use docchat_core::index::{chunk_by_chars, chunk_pages, PageText, CHUNK_OVERLAP_CHARS, CHUNK_SIZE_CHARS};
use docchat_core::search::{rank_by_similarity, AnnIndex};
use docchat_core::store::hash_content;

fn generate_page(paragraphs: usize) -> String {
    let mut page = String::new();
    for i in 0..paragraphs {
        page.push_str(&format!(
            "Paragraph {} describes the quarterly results in some detail. Revenue grew while \
             operating costs stayed flat, and the outlook for the next period remains stable.\n\n",
            i
        ));
    }
    page
}

fn pseudo_vectors(count: usize, dims: usize) -> Vec<(u32, Vec<f32>)> {
    (0..count)
        .map(|i| {
            let v = (0..dims)
                .map(|d| (((i * 31 + d * 17) % 97) as f32 / 97.0) - 0.5)
                .collect();
            (i as u32, v)
        })
        .collect()
}

fn bench_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_by_chars");

    for (name, paragraphs) in [("page_small", 3), ("page_medium", 20), ("page_large", 200)] {
        let content = generate_page(paragraphs);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &content, |b, content| {
            b.iter(|| chunk_by_chars(black_box(content), CHUNK_SIZE_CHARS, CHUNK_OVERLAP_CHARS));
        });
    }

    group.finish();
}

fn bench_chunk_document(c: &mut Criterion) {
    let pages: Vec<PageText> = (1..=50)
        .map(|n| PageText::new(n, generate_page(15)))
        .collect();

    c.bench_function("chunk_pages/50_pages", |b| {
        b.iter(|| {
            chunk_pages(
                black_box(&pages),
                "report.pdf",
                CHUNK_SIZE_CHARS,
                CHUNK_OVERLAP_CHARS,
            )
        });
    });
}

fn bench_content_hashing(c: &mut Criterion) {
    let content = generate_page(200);
    c.bench_function("hash_content/large_page", |b| {
        b.iter(|| hash_content(black_box(&content)));
    });
}

fn bench_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_neighbours");
    group.sample_size(20);

    let vectors = pseudo_vectors(5000, 384);
    let query = vectors[42].1.clone();
    let ann = AnnIndex::build(&vectors, 1);

    group.bench_function("brute_force_5000", |b| {
        b.iter(|| rank_by_similarity(black_box(&query), &vectors, 4));
    });
    group.bench_function("hnsw_5000", |b| {
        b.iter(|| ann.search(black_box(&query), 4));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_chunking,
    bench_chunk_document,
    bench_content_hashing,
    bench_ranking
);
criterion_main!(benches);
