use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use shortcode::{
    Attributes, ParserDirectory, ParserOptions, ShortcodeHandler, ShortcodeParser, UnclosedTags,
};

struct Figure;

impl ShortcodeHandler for Figure {
    fn expand(
        &self,
        attrs: &Attributes,
        content: Option<&str>,
        parser: &ShortcodeParser,
        _tag: &str,
    ) -> String {
        let src = attrs.get("src").unwrap_or_default();
        match content {
            Some(caption) => format!(
                r#"<figure><img src="{src}"><figcaption>{}</figcaption></figure>"#,
                parser.parse(caption)
            ),
            None => format!(r#"<figure><img src="{src}"></figure>"#),
        }
    }
}

fn site_parser() -> ShortcodeParser {
    let mut parser = ShortcodeParser::new();
    parser.register("figure", Figure);
    parser.register_fn("b", |_, content, _, _| {
        format!("<b>{}</b>", content.unwrap_or_default())
    });
    parser.register_fn("year", |_, _, _, _| "2024".to_owned());
    parser
}

#[test]
fn test_document_with_mixed_tags() {
    let parser = site_parser();
    let input = "Intro [b]bold[/b].\n\
                 [figure src=\"/a.png\"]Taken in [year /][/figure]\n\
                 [figure src='/b.png' /]\n\
                 Unknown [i]stays[/i].";

    assert_eq!(
        parser.parse(input),
        "Intro <b>bold</b>.\n\
         <figure><img src=\"/a.png\"><figcaption>Taken in 2024</figcaption></figure>\n\
         <figure><img src=\"/b.png\"></figure>\n\
         Unknown [i]stays[/i]."
    );
}

#[test]
fn test_documentation_example_escapes() {
    let parser = site_parser();
    let input = "Use [[year /]] to print the year: [year /].";
    assert_eq!(parser.parse(input), "Use [year /] to print the year: 2024.");
}

#[test]
fn test_escaped_tag_is_never_invoked() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut parser = ShortcodeParser::new();
    parser.register_fn("x", move |_, _, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        String::new()
    });

    assert_eq!(parser.parse("[[x]] and [[x /]]"), "[x] and [x /]");
    assert_eq!(parser.parse("[[x]body[/x]]"), "[x]body[/x]");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_text_without_tags_is_identity() {
    let parser = site_parser();
    for input in ["", "plain", "[", "]", "[]", "[/b]", "a [ b ] c", "[ b ]x[/b]"] {
        assert_eq!(parser.parse(input), input, "input: {input:?}");
    }
}

#[test]
fn test_nearest_closing_and_nesting() {
    let parser = site_parser();
    assert_eq!(parser.parse("[b]a[/b]b[/b]"), "<b>a</b>b[/b]");
    assert_eq!(parser.parse("[b][b]a[/b]b[/b]"), "<b>[b]a</b>b[/b]");
}

#[test]
fn test_unterminated_policies() {
    let parser = site_parser();
    assert_eq!(parser.parse("[b]never closed"), "[b]never closed");

    let mut lenient = ShortcodeParser::with_options(
        ParserOptions::new().with_unclosed_tags(UnclosedTags::Standalone),
    );
    lenient.register("figure", Figure);
    assert_eq!(
        lenient.parse("[figure src=x] after"),
        r#"<figure><img src="x"></figure> after"#
    );
}

#[test]
fn test_pathological_input_finishes() {
    let parser = site_parser();
    let input = "[b]".repeat(50_000);
    assert_eq!(parser.parse(&input), input);
}

#[test]
fn test_directory_namespaces() {
    let directory = ParserDirectory::new();
    directory
        .get("emails")
        .register_fn("name", |_, _, _, _| "Ada".to_owned());
    directory
        .get("pages")
        .register_fn("name", |_, _, _, _| "Home".to_owned());

    directory.set_active("emails");
    assert_eq!(directory.get_active().parse("Hi [name /]"), "Hi Ada");

    directory.set_active("pages");
    assert_eq!(directory.get_active().parse("Hi [name /]"), "Hi Home");

    assert_eq!(
        directory.identifiers(),
        vec!["emails".to_owned(), "pages".to_owned()]
    );
}

#[test]
fn test_registration_lifecycle() {
    let mut parser = site_parser();
    assert!(parser.registered("year"));

    parser.unregister("year");
    assert_eq!(parser.parse("[year /]"), "[year /]");

    parser.clear();
    assert_eq!(parser.parse("[b]x[/b]"), "[b]x[/b]");
}

#[test]
fn test_tag_directly_after_tag_stays_literal() {
    let parser = site_parser();

    assert_eq!(parser.parse("[year /][year /]"), "2024[year /]");
    assert_eq!(parser.parse("[b]a[/b][b]c[/b]"), "<b>a</b>[b]c[/b]");
    assert_eq!(parser.parse("[year /][[year /]]"), "2024[2024]");
    assert_eq!(parser.parse("[year /], [year /]"), "2024, 2024");
}
