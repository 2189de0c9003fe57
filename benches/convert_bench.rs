//! Benchmark for opset conversion
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use onnx_version_converter::graph::Graph;
use onnx_version_converter::proto::extensions::{make_model, make_node};
use onnx_version_converter::proto::{AttributeProto, ModelProto, NodeProto};
use onnx_version_converter::{OpSetId, VersionConverter};

/// Chain of `width` Relu -> Squeeze -> Add blocks at opset 11
fn make_wide_model(width: usize) -> ModelProto {
    let mut nodes: Vec<NodeProto> = Vec::with_capacity(width * 3);
    let mut prev = "X".to_string();
    for i in 0..width {
        let relu = format!("relu_{}", i);
        let squeeze = format!("squeeze_{}", i);
        let add = format!("add_{}", i);

        nodes.push(make_node("Relu", &[prev.as_str()], &[relu.as_str()], &relu));
        let mut node = make_node("Squeeze", &[relu.as_str()], &[squeeze.as_str()], &squeeze);
        node.attribute.push(AttributeProto::new_ints("axes", vec![0]));
        nodes.push(node);
        nodes.push(make_node("Add", &[squeeze.as_str(), "B"], &[add.as_str()], &add));
        prev = add;
    }
    make_model(nodes, vec![], 11)
}

fn convert_benchmark(c: &mut Criterion) {
    let converter = VersionConverter::with_builtin();
    let mut group = c.benchmark_group("convert_11_to_14");

    for width in [10usize, 100, 1000] {
        let model = make_wide_model(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &model, |b, model| {
            b.iter(|| {
                converter
                    .convert(black_box(model), &OpSetId::onnx(11), &OpSetId::onnx(14))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn plan_benchmark(c: &mut Criterion) {
    let converter = VersionConverter::with_builtin();
    let graph = Graph::import(&make_wide_model(1000)).unwrap();

    c.bench_function("plan_11_to_14", |b| {
        b.iter(|| {
            converter
                .plan(black_box(&graph), &OpSetId::onnx(11), &OpSetId::onnx(14))
                .unwrap()
        })
    });
}

criterion_group!(benches, convert_benchmark, plan_benchmark);
criterion_main!(benches);
