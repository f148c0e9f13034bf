//! Benchmarks for shortcode parsing.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use shortcode::ShortcodeParser;

fn parser() -> ShortcodeParser {
    let mut parser = ShortcodeParser::new();
    parser.register_fn("link", |attrs, content, _, _| {
        let href = attrs.get("href").unwrap_or("#");
        format!(r#"<a href="{href}">{}</a>"#, content.unwrap_or(href))
    });
    parser.register_fn("year", |_, _, _, _| "2024".to_owned());
    parser.register_fn("note", |_, content, parser, _| {
        format!("<aside>{}</aside>", parser.parse(content.unwrap_or_default()))
    });
    parser
}

/// Generate a document with `paragraphs` paragraphs, each carrying a few tags.
fn generate_document(paragraphs: usize) -> String {
    let mut doc = String::with_capacity(paragraphs * 160);
    for i in 0..paragraphs {
        doc.push_str(&format!(
            "Paragraph {i} links [link href=\"/p/{i}\"]here[/link] in [year /]. \
             [note]See [link href=\"/n\" /].[/note] Escaped: [[year /]]\n\n"
        ));
    }
    doc
}

fn bench_parse_plain_text(c: &mut Criterion) {
    let parser = parser();
    let text = "Plain prose without any markup. ".repeat(1_000);

    c.bench_function("parse_plain_text", |b| b.iter(|| parser.parse(&text)));
}

fn bench_parse_document_sizes(c: &mut Criterion) {
    let parser = parser();
    let mut group = c.benchmark_group("parse_document");

    for paragraphs in [10, 100, 1_000] {
        let doc = generate_document(paragraphs);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(paragraphs), &doc, |b, doc| {
            b.iter(|| parser.parse(doc));
        });
    }

    group.finish();
}

fn bench_parse_unterminated_openings(c: &mut Criterion) {
    let parser = parser();
    let mut group = c.benchmark_group("parse_unterminated");

    for count in [1_000, 10_000] {
        let doc = "[note]".repeat(count);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &doc, |b, doc| {
            b.iter(|| parser.parse(doc));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_plain_text,
    bench_parse_document_sizes,
    bench_parse_unterminated_openings
);
criterion_main!(benches);
