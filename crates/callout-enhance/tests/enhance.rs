use callout_enhance::{enhance, enhance_html, parse_html, serialize, serialize_node, Document};
use pretty_assertions::assert_eq;

fn enhance_fragment(source: &str) -> (Document, String) {
    let mut document = parse_html(source);
    let root = document.root();
    enhance(&mut document, root);
    let html = serialize(&document);
    (document, html)
}

#[test]
fn should_convert_note_with_custom_title() {
    // Given
    let source = "<blockquote><p>[!note] Remember this</p></blockquote>";

    // When
    let (document, html) = enhance_fragment(source);

    // Then
    assert_eq!(
        html,
        r#"<blockquote class="callout callout-note"><div class="callout-title">Remember this</div><p></p></blockquote>"#
    );
    let quote = document.elements_by_name(document.root(), "blockquote")[0];
    assert_eq!(document.class_list(quote), vec!["callout", "callout-note"]);
}

#[test]
fn should_default_title_to_capitalised_type() {
    // Given
    let source = "<blockquote><p>[!warning]</p></blockquote>";

    // When
    let (output, report) = enhance_html(source);

    // Then
    assert_eq!(report.len(), 1);
    assert_eq!(report.callouts[0].kind, "warning");
    assert_eq!(report.callouts[0].title, "Warning");
    assert!(output.contains(r#"<div class="callout-title">Warning</div>"#));
}

#[test]
fn should_leave_blockquote_without_block_child_untouched() {
    // Given
    let source = "<blockquote>[!note] bare text <em>inline</em></blockquote>";

    // When
    let (output, report) = enhance_html(source);

    // Then
    assert!(report.is_empty());
    assert_eq!(output, source);
}

#[test]
fn should_leave_non_matching_blockquote_untouched() {
    // Given
    let source = "<blockquote><p>Just a quote</p><p>[!note] too late</p></blockquote>";

    // When
    let (output, report) = enhance_html(source);

    // Then
    assert!(report.is_empty());
    assert_eq!(output, source);
}

#[test]
fn should_only_touch_the_marked_sibling() {
    // Given
    let source = concat!(
        r#"<blockquote id="plain"><p>Quoted <strong>wisdom</strong></p></blockquote>"#,
        "<blockquote><p>[!tip] Try this</p></blockquote>",
    );
    let before = parse_html(source);
    let plain_before = serialize_node(&before, before.elements_by_name(before.root(), "blockquote")[0]);

    // When
    let (document, _) = enhance_fragment(source);

    // Then
    let quotes = document.elements_by_name(document.root(), "blockquote");
    assert_eq!(serialize_node(&document, quotes[0]), plain_before);
    assert!(document.has_class(quotes[1], "callout-tip"));
}

#[test]
fn should_be_a_no_op_on_second_pass() {
    // Given
    let source = concat!(
        "<blockquote><p>[!note] First</p></blockquote>",
        "<blockquote><div>[!danger]</div><p>Body</p></blockquote>",
    );
    let (mut document, first_pass) = enhance_fragment(source);

    // When
    let root = document.root();
    let report = enhance(&mut document, root);

    // Then
    assert!(report.is_empty());
    assert_eq!(serialize(&document), first_pass);
}

#[test]
fn should_keep_text_after_the_first_line() {
    // Given
    let source = "<blockquote><p>[!info] Heads up\nThe body continues.</p></blockquote>";

    // When
    let (output, _) = enhance_html(source);

    // Then
    assert_eq!(
        output,
        "<blockquote class=\"callout callout-info\"><div class=\"callout-title\">Heads up</div><p>\nThe body continues.</p></blockquote>"
    );
}

#[test]
fn should_flatten_inline_markup_in_first_block() {
    // Given
    let source = "<blockquote><p>[!note] Title <em>emphasis</em>\nrest</p></blockquote>";

    // When
    let (output, report) = enhance_html(source);

    // Then
    assert_eq!(report.callouts[0].title, "Title emphasis");
    assert!(output.contains("<p>\nrest</p>"));
}

#[test]
fn should_preserve_existing_classes_and_lowercase_type() {
    // Given
    let source = r#"<blockquote class="wide callout"><p>[!Caution] Hot</p></blockquote>"#;

    // When
    let (output, _) = enhance_html(source);

    // Then
    assert!(output.starts_with(r#"<blockquote class="wide callout callout-caution">"#));
}

#[test]
fn should_place_title_before_the_child_holding_a_nested_block() {
    // Given
    let source = "<blockquote><section><p>[!note] Nested</p></section></blockquote>";

    // When
    let (output, _) = enhance_html(source);

    // Then
    assert_eq!(
        output,
        r#"<blockquote class="callout callout-note"><div class="callout-title">Nested</div><section><p></p></section></blockquote>"#
    );
}

#[test]
fn should_enhance_full_hugo_page() {
    // Given
    let source = concat!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>Post</title></head>\n",
        "<body><article><h1>Post</h1>\n",
        "<blockquote>\n<p>[!important] Read first</p>\n<p>Details.</p>\n</blockquote>\n",
        "</article></body></html>",
    );

    // When
    let (output, report) = enhance_html(source);

    // Then
    assert_eq!(report.len(), 1);
    assert!(output.starts_with("<!DOCTYPE html>"));
    assert!(output.contains(
        "<blockquote class=\"callout callout-important\">\n<div class=\"callout-title\">Read first</div><p></p>\n<p>Details.</p>\n</blockquote>"
    ));
}

#[test]
fn should_scan_only_the_given_scope() {
    // Given
    let source = concat!(
        "<blockquote><p>[!note] Outside</p></blockquote>",
        "<main><blockquote><p>[!note] Inside</p></blockquote></main>",
    );
    let mut document = parse_html(source);
    let main = document.elements_by_name(document.root(), "main")[0];

    // When
    let report = enhance(&mut document, main);

    // Then
    assert_eq!(report.len(), 1);
    assert_eq!(report.callouts[0].title, "Inside");
    let quotes = document.elements_by_name(document.root(), "blockquote");
    assert!(!document.has_class(quotes[0], "callout"));
}

#[test]
fn should_escape_title_text() {
    // Given
    let source = "<blockquote><p>[!note] a &lt;b&gt; &amp; c</p></blockquote>";

    // When
    let (output, report) = enhance_html(source);

    // Then
    assert_eq!(report.callouts[0].title, "a <b> & c");
    assert!(output.contains(r#"<div class="callout-title">a &lt;b&gt; &amp; c</div>"#));
}

#[test]
fn should_keep_page_structure_when_a_comment_precedes_the_doctype() {
    // Given
    let source = concat!(
        "<!-- generated -->\n<!DOCTYPE html><html lang=\"en\"><head><title>T</title></head>",
        "<body><blockquote><p>[!note] Hi</p></blockquote></body></html>",
    );

    // When
    let (output, report) = enhance_html(source);

    // Then
    assert_eq!(report.len(), 1);
    assert_eq!(
        output,
        concat!(
            "<!-- generated --><!DOCTYPE html><html lang=\"en\"><head><title>T</title></head>",
            "<body><blockquote class=\"callout callout-note\"><div class=\"callout-title\">Hi</div><p></p></blockquote></body></html>",
        )
    );
}

#[test]
fn should_leave_inline_svg_untouched() {
    // Given
    let svg = concat!(
        r#"<svg xmlns:xlink="http://www.w3.org/1999/xlink">"#,
        r##"<use xlink:href="#i"></use></svg>"##,
    );
    let source = format!("<blockquote><p>[!tip] Icons</p>{svg}</blockquote>");

    // When
    let (output, report) = enhance_html(&source);

    // Then
    assert_eq!(report.len(), 1);
    assert!(output.contains(svg), "{output}");
}
