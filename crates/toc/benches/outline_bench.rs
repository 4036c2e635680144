use criterion::{Criterion, black_box, criterion_group, criterion_main};
use html::Node;
use toc::{HeadingLocator, build_outline};

const SECTIONS: usize = 2_000;

fn make_scrap(sections: usize) -> Node {
    let mut content = Node::element("div").with_attr("class", "znc");
    for i in 0..sections {
        let level = 1 + (i % 3) as u8;
        content = content
            .with_child(
                Node::element(&format!("h{level}"))
                    .with_attr("class", "code-line")
                    .with_child(Node::text(format!("Section {i}"))),
            )
            .with_child(
                Node::element("p").with_child(Node::text("Lorem ipsum dolor sit amet.")),
            )
            .with_child(
                Node::element("pre").with_child(
                    Node::element("h2")
                        .with_attr("class", "code-line")
                        .with_child(Node::text("not a heading")),
                ),
            );
    }
    Node::element("main").with_child(content)
}

fn bench_locate(c: &mut Criterion) {
    let doc = make_scrap(SECTIONS);
    let locator = HeadingLocator::default();
    c.bench_function("bench_locate_large", |b| {
        b.iter(|| {
            let found = locator.locate(black_box(&doc));
            black_box(found.len());
        });
    });
}

fn bench_locate_and_build(c: &mut Criterion) {
    let doc = make_scrap(SECTIONS);
    let locator = HeadingLocator::default();
    c.bench_function("bench_locate_and_build_large", |b| {
        b.iter(|| {
            let outline = build_outline(locator.locate(black_box(&doc)));
            black_box(outline.len());
        });
    });
}

criterion_group!(benches, bench_locate, bench_locate_and_build);
criterion_main!(benches);
