use criterion::{black_box, criterion_group, criterion_main, Criterion};
use netsplit_cidr::NetworkBlock;
use netsplit_partition::SubnetPartitioner;

fn bench_partition(c: &mut Criterion) {
    let partitioner = SubnetPartitioner::new();
    let block = NetworkBlock::parse("10.0.0.0/8").expect("valid block");

    c.bench_function("partition_slash_8_into_16", |b| {
        b.iter(|| partitioner.partition(black_box(&block), black_box(16)))
    });

    c.bench_function("partition_slash_8_into_4096", |b| {
        b.iter(|| partitioner.partition(black_box(&block), black_box(4096)))
    });
}

fn bench_plan(c: &mut Criterion) {
    let partitioner = SubnetPartitioner::new();
    let block = NetworkBlock::parse("192.168.0.0/16").expect("valid block");

    c.bench_function("plan_slash_16", |b| {
        b.iter(|| partitioner.plan(black_box(&block), black_box(300)))
    });
}

criterion_group!(benches, bench_partition, bench_plan);
criterion_main!(benches);
