#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use morph::{convert, json, toon, Format};

fn sample_json(rows: usize) -> String {
    let mut out = String::from(r#"{"meta":{"version":3,"tags":["a","b"]},"users":["#);
    for i in 0..rows {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(
            r#"{{"id":{i},"name":"user{i}","active":{}}}"#,
            i % 2 == 0
        ));
    }
    out.push_str("]}");
    out
}

fn bench_json_parse(c: &mut Criterion) {
    let input = sample_json(200);
    c.bench_function("parse_json", |b| {
        b.iter(|| json::parser::parse(black_box(&input)).unwrap())
    });
}

fn bench_toon_encode(c: &mut Criterion) {
    let value = json::parser::parse(&sample_json(200)).unwrap();
    c.bench_function("encode_toon", |b| b.iter(|| toon::to_string(black_box(&value))));
}

fn bench_toon_decode(c: &mut Criterion) {
    let text = toon::to_string(&json::parser::parse(&sample_json(200)).unwrap());
    c.bench_function("decode_toon", |b| {
        b.iter(|| toon::parse(black_box(&text)).unwrap())
    });
}

fn bench_convert_json_to_yaml(c: &mut Criterion) {
    let input = sample_json(200);
    c.bench_function("convert_json_to_yaml", |b| {
        b.iter(|| convert(Format::Json, Format::Yaml, black_box(&input)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_json_parse,
    bench_toon_encode,
    bench_toon_decode,
    bench_convert_json_to_yaml
);
criterion_main!(benches);
