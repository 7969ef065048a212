use paste_router_engine::clipboard::{ClipboardEvent, TEXT_HTML, TEXT_PLAIN, VSCODE_EDITOR_DATA};
use paste_router_engine::editing::{BlockKind, Document, Mark, MarkSpan};
use paste_router_engine::paste::{PasteDispatcher, PasteResult};

#[test]
fn fixture_markdown_checklist() {
    assert_fixture(
        "markdown_checklist",
        Document::new(""),
        text("[x] buy milk\n[ ] call mom"),
    );
}

#[test]
fn fixture_markdown_into_paragraph() {
    assert_fixture(
        "markdown_into_paragraph",
        Document::new("Intro: "),
        text("see **bold** and [docs](https://docs.rs)"),
    );
}

#[test]
fn fixture_heading_mid_line() {
    assert_fixture(
        "heading_mid_line",
        Document::new("beforeafter").with_selection(6..6),
        text("# Title"),
    );
}

#[test]
fn fixture_vscode_python() {
    assert_fixture(
        "vscode_python",
        Document::new(""),
        text("print(1)")
            .with_text(TEXT_HTML, "<div><span>print(1)</span></div>")
            .with_text(VSCODE_EDITOR_DATA, r#"{"version":1,"mode":"python"}"#),
    );
}

#[test]
fn fixture_vscode_unknown_language() {
    assert_fixture(
        "vscode_unknown_language",
        Document::new(""),
        text("x := 1").with_text(VSCODE_EDITOR_DATA, r#"{"mode":"foobar"}"#),
    );
}

#[test]
fn fixture_code_across_heading_boundary() {
    assert_fixture(
        "code_across_heading_boundary",
        Document::new("Title\nbody")
            .with_block(0..5, BlockKind::Heading { level: 2 })
            .with_selection(3..8),
        text("x = 1").with_text(VSCODE_EDITOR_DATA, r#"{"mode":"python"}"#),
    );
}

#[test]
fn fixture_code_context_literal() {
    assert_fixture(
        "code_context_literal",
        Document::new("let s = ;")
            .with_block(0..9, BlockKind::CodeFence { language: None })
            .with_selection(8..8),
        text("# heading http://x.com"),
    );
}

#[test]
fn fixture_url_over_selection() {
    assert_fixture(
        "url_over_selection",
        Document::new("read the docs today").with_selection(9..13),
        text("https://docs.rs"),
    );
}

#[test]
fn fixture_url_at_cursor() {
    assert_fixture(
        "url_at_cursor",
        Document::new("go  now").with_selection(3..3),
        text("http://x.com"),
    );
}

#[test]
fn fixture_embeddable_url_in_table() {
    assert_fixture(
        "embeddable_url_in_table",
        Document::new("a | b").with_block(0..5, BlockKind::Table),
        text("https://youtu.be/dQw4w9WgXcQ"),
    );
}

#[test]
fn fixture_internal_html_deferred() {
    assert_fixture(
        "internal_html_deferred",
        Document::new("keep"),
        text("# Title").with_text(TEXT_HTML, r#"<h1 data-pm-slice="1 1 []">Title</h1>"#),
    );
}

#[test]
fn fixture_web_html_deferred() {
    assert_fixture(
        "web_html_deferred",
        Document::new("keep"),
        text("Some article text").with_text(TEXT_HTML, "<p>Some <b>article</b> text</p>"),
    );
}

#[test]
fn fixture_empty_markdown_suppressed() {
    assert_fixture("empty_markdown_suppressed", Document::new("keep"), text("\n\n"));
}

fn text(plain: &str) -> ClipboardEvent {
    ClipboardEvent::default().with_text(TEXT_PLAIN, plain)
}

fn assert_fixture(name: &str, mut doc: Document, event: ClipboardEvent) {
    let mut dispatcher = PasteDispatcher::new();
    dispatcher.mount();

    let result = dispatcher.dispatch(&mut doc, &event);
    insta::assert_snapshot!(name, render(&result, &doc));
}

fn render(result: &PasteResult, doc: &Document) -> String {
    let outcome = match result {
        PasteResult::Applied { rule, .. } => format!("applied by {rule}"),
        PasteResult::Suppressed { rule } => format!("suppressed by {rule}"),
        PasteResult::Deferred { rule, reason } => format!("deferred by {rule} ({reason})"),
        PasteResult::Rejected { rule, error } => format!("rejected by {rule}: {error}"),
        PasteResult::Unmounted => "unmounted".to_string(),
    };
    format!("outcome: {outcome}\n{}", doc.snapshot())
}

/// Whatever the paste, the dispatcher reports exactly one outcome and a
/// declined paste never changes the document
#[test]
fn declined_pastes_leave_document_untouched() {
    let mut dispatcher = PasteDispatcher::new();
    dispatcher.mount();

    let events = [
        ClipboardEvent::empty(),
        text(""),
        text("words").with_text(TEXT_HTML, "<p>words</p>"),
        text("x").with_text(TEXT_HTML, r#"<p data-pm-slice="0 0 []">x</p>"#),
    ];

    for event in &events {
        let mut doc = Document::new("unchanged").with_selection(2..4);
        let before = doc.clone();

        let result = dispatcher.dispatch(&mut doc, event);

        assert!(matches!(result, PasteResult::Deferred { .. }), "{result:?}");
        assert_eq!(doc, before);
    }
}

#[test]
fn in_code_paste_applies_no_marks() {
    let mut dispatcher = PasteDispatcher::new();
    dispatcher.mount();
    let mut doc = Document::new("")
        .with_block(0..0, BlockKind::CodeFence { language: None })
        .with_selection(0..0);

    assert!(dispatcher.handle(&mut doc, &text("**bold** [a](https://b.c)")));
    assert_eq!(doc.text(), "**bold** [a](https://b.c)");
    assert!(doc.marks().is_empty());
}

#[test]
fn backwards_selection_links_selected_text() {
    let mut dispatcher = PasteDispatcher::new();
    dispatcher.mount();
    let mut doc = Document::new("read the docs today").with_selection(13..9);

    let result = dispatcher.dispatch(&mut doc, &text("https://docs.rs"));

    assert_eq!(result.rule(), Some("url_over_selection"));
    assert_eq!(doc.text(), "read the docs today");
    assert_eq!(
        doc.marks(),
        &[MarkSpan::new(
            9..13,
            Mark::Link {
                href: "https://docs.rs".to_string()
            }
        )]
    );
}
