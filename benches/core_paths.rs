//! 核心路径性能基准测试

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use quicklink::analytics::{AccessLogEntry, AccessLogPipeline, AccessLogSink};
use quicklink::rate_limit::RateLimiter;
use quicklink::services::{IdGenerator, LinkService, NanoIdGenerator};
use quicklink::store::MemoryStore;

// ============== ID 生成 ==============

fn bench_id_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("id_generator");

    for length in [6usize, 12, 21] {
        let generator = NanoIdGenerator::new(length);
        group.bench_with_input(BenchmarkId::from_parameter(length), &generator, |b, g| {
            b.iter(|| g.generate().unwrap());
        });
    }

    group.finish();
}

// ============== 限流检查 ==============

fn bench_rate_limit_check(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let limiter = Arc::new(RateLimiter::new(Arc::new(MemoryStore::new())));

    c.bench_function("rate_limit/single_client", |b| {
        b.to_async(&rt).iter(|| {
            let l = Arc::clone(&limiter);
            async move { l.check("1.2.3.4").await.unwrap() }
        });
    });

    // 客户端轮换，覆盖新窗口（INCR + EXPIRE）路径
    let next = AtomicU64::new(0);
    c.bench_function("rate_limit/rotating_clients", |b| {
        b.to_async(&rt).iter(|| {
            let l = Arc::clone(&limiter);
            let client = format!("10.0.{}", next.fetch_add(1, Ordering::Relaxed));
            async move { l.check(&client).await.unwrap() }
        });
    });
}

// ============== 解析 + 访问日志入队 ==============

struct NullSink;

#[async_trait]
impl AccessLogSink for NullSink {
    async fn log_access(&self, _entry: AccessLogEntry) -> anyhow::Result<()> {
        Ok(())
    }
}

fn bench_resolve(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (service, id) = rt.block_on(async {
        let pipeline = AccessLogPipeline::start(Arc::new(NullSink), 100);
        let service = Arc::new(LinkService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(NanoIdGenerator::default()),
            pipeline.logger(),
        ));
        let id = service.shorten("https://example.com").await.unwrap();
        // worker 由 runtime 持有，pipeline 句柄可以直接丢弃
        drop(pipeline);
        (service, id)
    });

    c.bench_function("link_service/resolve", |b| {
        b.to_async(&rt).iter(|| {
            let s = Arc::clone(&service);
            let id = id.clone();
            async move { s.resolve(&id, "1.2.3.4").await.unwrap() }
        });
    });
}

criterion_group!(
    benches,
    bench_id_generation,
    bench_rate_limit_check,
    bench_resolve
);
criterion_main!(benches);
