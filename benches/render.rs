use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

fn read_fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(path).unwrap()
}

fn bench_flatten(c: &mut Criterion) {
    let raw = read_fixture("flight_reservation.eml");
    let content = mailcards::parser::mime::parse_message(&raw).unwrap();

    c.bench_function("flatten_alternative", |b| {
        b.iter(|| mailcards::flatten::flatten(&content.viewables).unwrap())
    });
}

fn bench_extract(c: &mut Criterion) {
    let raw = read_fixture("flight_reservation.eml");
    let content = mailcards::parser::mime::parse_message(&raw).unwrap();
    let flat = mailcards::flatten::flatten(&content.viewables).unwrap();
    let extractor = mailcards::extract::StructuredDataExtractor::default();

    c.bench_function("extract_json_ld", |b| {
        b.iter(|| extractor.extract(&flat.html, &flat.text, &[], &[], None))
    });
}

fn bench_full_view(c: &mut Criterion) {
    let pipeline = mailcards::pipeline::MessageViewExtractor::default();
    for name in ["flight_reservation.eml", "train_trip.eml", "invite.eml"] {
        let raw = read_fixture(name);
        c.bench_function(&format!("view_{name}"), |b| {
            b.iter(|| pipeline.view_raw_message(&raw).unwrap())
        });
    }
}

criterion_group!(benches, bench_flatten, bench_extract, bench_full_view);
criterion_main!(benches);
