//! Locator and gate benchmark suite.
//!
//! Measures target lookup against home timelines of growing size, and the
//! navigation gate on representative URLs.
//!
//! Run with: cargo bench --bench locator
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use following_tab::controller::evaluate;
use following_tab::{MemoryPage, NavigationContext, NodeSpec, SiteProfile, TargetLocator};
use tokio::runtime::Runtime;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const TIMELINE_SIZES: &[usize] = &[10, 100, 1000];

const GATE_CASES: &[(&str, &str, Option<&str>)] = &[
    ("fresh_home", "https://x.com/home", None),
    ("external", "https://x.com/", Some("https://news.example/story")),
    ("internal", "https://x.com/home", Some("https://x.com/notifications")),
    ("not_home", "https://x.com/explore", None),
];

// ============================================================================
// Fixtures
// ============================================================================

/// Home page with a tab strip followed by `posts` timeline articles.
fn home_with_timeline(posts: usize) -> MemoryPage {
    let tab = || NodeSpec::new("div").with_role("tab");
    let article = |i: usize| {
        NodeSpec::new("article")
            .with_attribute("data-testid", "tweet")
            .with_child(NodeSpec::new("div").with_role("button").with_class(&format!("r-{i}")))
    };

    let main = NodeSpec::new("main")
        .with_child(
            NodeSpec::new("div")
                .with_role("tablist")
                .with_children([tab().with_attribute("aria-selected", "true"), tab()]),
        )
        .with_child(NodeSpec::new("section").with_children((0..posts).map(article)));

    MemoryPage::with_body("https://x.com/home", None, NodeSpec::new("body").with_child(main))
}

// ============================================================================
// Benchmark: Target Lookup
// ============================================================================

fn bench_find_target(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let locator = TargetLocator::new();

    let mut group = c.benchmark_group("find_target");

    for &posts in TIMELINE_SIZES {
        let page = home_with_timeline(posts);
        group.bench_with_input(BenchmarkId::new("posts", posts), &page, |b, page| {
            b.to_async(&rt)
                .iter(|| async { black_box(locator.find_target_tab(page).await) });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Selection Check
// ============================================================================

fn bench_is_target_selected(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let locator = TargetLocator::new();

    let mut group = c.benchmark_group("is_target_selected");

    for &posts in TIMELINE_SIZES {
        let page = home_with_timeline(posts);
        group.bench_with_input(BenchmarkId::new("posts", posts), &page, |b, page| {
            b.to_async(&rt)
                .iter(|| async { black_box(locator.is_target_selected(page).await) });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Navigation Gate
// ============================================================================

fn bench_gate(c: &mut Criterion) {
    let site = SiteProfile::new();

    let mut group = c.benchmark_group("gate");

    for &(name, url, referrer) in GATE_CASES {
        group.bench_function(name, |b| {
            b.iter(|| {
                let context = NavigationContext::new(black_box(url), black_box(referrer))
                    .expect("valid url");
                black_box(evaluate(&context, &site))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_find_target,
    bench_is_target_selected,
    bench_gate
);
criterion_main!(benches);
