use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sitecanvas_dom::{parse, serialize, tag_html, IdIssuer};

fn sample_page() -> String {
    let mut body = String::new();
    for i in 0..200 {
        body.push_str(&format!(
            "<section class=\"row\"><h2>Item {i}</h2><p style=\"color: #333\">Lorem ipsum dolor sit amet.</p><img src=\"img/{i}.png\"></section>"
        ));
    }
    format!(
        "<!DOCTYPE html><html><head><title>bench</title><style>.row {{ margin: 8px; }}</style></head><body>{body}</body></html>"
    )
}

fn bench_parse(c: &mut Criterion) {
    let source = sample_page();
    c.bench_function("parse_page", |b| {
        b.iter(|| parse(black_box(&source)));
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let source = sample_page();
    c.bench_function("parse_serialize_page", |b| {
        b.iter(|| serialize(&parse(black_box(&source))));
    });
}

fn bench_tagging(c: &mut Criterion) {
    let source = sample_page();
    c.bench_function("tag_page", |b| {
        b.iter(|| {
            let mut issuer = IdIssuer::new();
            tag_html(black_box(&source), &mut issuer)
        });
    });
}

criterion_group!(benches, bench_parse, bench_round_trip, bench_tagging);
criterion_main!(benches);
