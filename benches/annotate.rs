use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glosstip::glossary::Term;
use glosstip::{Annotator, Config, Glossary};

fn glossary() -> Glossary {
    let mut terms = vec![
        Term::new(&["hit", "strike"], "A successful attack.").whole_word(true),
        Term::new(&["on-hit", "onhit"], "Triggers when an attack lands.").whole_word(true),
        Term::new(&["Armor Class", "AC"], "How hard you are to hit.").case_sensitive(true),
    ];
    for i in 0..200 {
        let alias = format!("keyword{}", i);
        terms.push(Term::new(&[alias.as_str()], "Filler term.").whole_word(true));
    }
    Glossary::new(terms)
}

fn page() -> String {
    let paragraph = "<p>Each on-hit effect applies once per hit. Your Armor Class (AC) \
                     decides whether a strike lands. <code>hit()</code> keyword42.</p>\n";
    format!(
        "<html><head><title>Rules</title></head><body>{}</body></html>",
        paragraph.repeat(500)
    )
}

fn bench_annotate(c: &mut Criterion) {
    let config = Config {
        max_per_term: usize::MAX,
        max_total: usize::MAX,
        ..Default::default()
    };
    let annotator = Annotator::new(&glossary(), &config);
    let capped = Annotator::new(&glossary(), &Config::default());
    let html = page();

    c.bench_function("annotate_uncapped", |b| {
        b.iter(|| annotator.annotate_html(black_box(&html)))
    });
    c.bench_function("annotate_default_caps", |b| {
        b.iter(|| capped.annotate_html(black_box(&html)))
    });
}

fn bench_tokenize(c: &mut Criterion) {
    let html = "<script>x</script><p>t</p>".repeat(40_000);

    c.bench_function("tokenize_script_heavy", |b| {
        b.iter(|| glosstip::parser::html::tokenize(black_box(&html)))
    });
}

criterion_group!(benches, bench_annotate, bench_tokenize);
criterion_main!(benches);
