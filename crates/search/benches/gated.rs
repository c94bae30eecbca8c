use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ncr_flags::Flagset;
use ncr_search::{
    Context, DEFAULT_FLAG_NAME, GatedSearchFacade, MemorySearch, Node, ParsedQuery, SearchBackend,
    SearchRequest, SearchResponse,
};
use std::hint::black_box;

fn nodes(count: usize) -> Vec<Node> {
    (0..count)
        .map(|i| {
            Node::new(format!("acme:article:{i:06}").parse().unwrap())
                .with_field("title", format!("Article number {i}"))
                .with_field("status", if i % 3 == 0 { "draft" } else { "published" })
        })
        .collect()
}

// ============================================================================
// Benchmark: Gating overhead on the write path
// ============================================================================

fn bench_gated_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("gated_writes");
    let ctx = Context::new();
    let batch = nodes(64);
    group.throughput(Throughput::Elements(batch.len() as u64));

    for disabled in [false, true] {
        let flags = Flagset::new();
        flags.set(DEFAULT_FLAG_NAME, disabled).unwrap();
        let search = GatedSearchFacade::new(flags, MemorySearch::new());

        let label = if disabled { "read_only" } else { "writable" };
        group.bench_with_input(BenchmarkId::new("index_nodes", label), &batch, |b, batch| {
            b.iter(|| search.index_nodes(black_box(batch), &ctx).unwrap());
        });
    }

    let direct = MemorySearch::new();
    group.bench_with_input(BenchmarkId::new("index_nodes", "unwrapped"), &batch, |b, batch| {
        b.iter(|| direct.index_nodes(black_box(batch), &ctx).unwrap());
    });

    group.finish();
}

// ============================================================================
// Benchmark: Query evaluation through the facade
// ============================================================================

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let ctx = Context::new();
    let search = GatedSearchFacade::new(Flagset::new(), MemorySearch::new());
    search.index_nodes(&nodes(10_000), &ctx).unwrap();

    let queries =
        [("match_all", ""), ("term", "number"), ("boolean", "+status:published -title:\"number 1\"")];
    for (label, raw) in queries {
        let request = SearchRequest::new(raw);
        let query = ParsedQuery::parse(raw);
        group.bench_with_input(BenchmarkId::new("search_nodes", label), &query, |b, query| {
            b.iter(|| {
                let mut response = SearchResponse::default();
                search.search_nodes(&request, query, &mut response, &[], &ctx).unwrap();
                black_box(response.total)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_gated_writes, bench_search);
criterion_main!(benches);
