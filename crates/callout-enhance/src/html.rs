//! HTML front end: parse markup into a [`Document`] and write it back out.

use std::collections::HashMap;

use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{Html, Node};

use crate::dom::{Doctype, Document, ElementData, NodeId, NodeKind};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe",
    "noembed",
    "noframes",
    "noscript",
    "plaintext",
    "script",
    "style",
    "xmp",
];

const NEWLINE_SENSITIVE_ELEMENTS: &[&str] = &["listing", "pre", "textarea"];

const DOCUMENT_TAGS: &[&str] = &["html", "head", "body"];

/// Whether `source` looks like a complete page rather than a body fragment.
///
/// Leading whitespace, a byte order mark and comments are skipped; the page
/// counts as complete when what follows is a doctype or an `html`, `head` or
/// `body` start tag.
pub fn is_full_document(source: &str) -> bool {
    let mut rest = source.trim_start_matches('\u{feff}');
    loop {
        rest = rest.trim_start();
        match rest.strip_prefix("<!--") {
            Some(comment) => match comment.find("-->") {
                Some(end) => rest = &comment[end + 3..],
                None => return false,
            },
            None => break,
        }
    }

    let Some(tag) = rest.strip_prefix('<') else {
        return false;
    };
    if starts_with_ignore_case(tag, "!doctype") {
        return true;
    }
    DOCUMENT_TAGS.iter().any(|name| {
        starts_with_ignore_case(tag, name)
            && tag[name.len()..]
                .chars()
                .next()
                .map_or(true, |next| next == '>' || next == '/' || next.is_ascii_whitespace())
    })
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Parse HTML into an owned tree.
///
/// Full pages keep their doctype and `html`/`head`/`body` structure. Anything
/// else is treated as a body fragment whose top-level nodes become children
/// of the document root. Malformed markup is repaired, never rejected.
pub fn parse_html(source: &str) -> Document {
    if is_full_document(source) {
        build(&Html::parse_document(source), false)
    } else {
        build(&Html::parse_fragment(source), true)
    }
}

fn build(html: &Html, fragment: bool) -> Document {
    let tree_root = html.tree.root();
    // Fragments are parsed inside a synthetic `<html>` element.
    let container = if fragment {
        tree_root
            .children()
            .find(|child| matches!(child.value(), Node::Element(element) if element.name() == "html"))
            .unwrap_or(tree_root)
    } else {
        tree_root
    };

    let mut document = Document::new();
    let mut ids = HashMap::new();
    ids.insert(container.id(), document.root());

    for node in container.descendants().skip(1) {
        let Some(parent) = node
            .parent()
            .and_then(|parent| ids.get(&parent.id()).copied())
        else {
            continue;
        };

        let kind = match node.value() {
            Node::Doctype(doctype) => NodeKind::Doctype(Doctype {
                name: doctype.name().to_owned(),
                public_id: doctype.public_id().to_owned(),
                system_id: doctype.system_id().to_owned(),
            }),
            Node::Element(element) => NodeKind::Element(ElementData {
                name: element.name().to_owned(),
                attrs: element
                    .attrs
                    .iter()
                    .map(|(name, value)| {
                        let local: &str = &name.local;
                        let value: &str = value;
                        // Foreign attributes such as `xlink:href` keep their prefix.
                        let qualified = match &name.prefix {
                            Some(prefix) => format!("{}:{local}", &**prefix),
                            None => local.to_owned(),
                        };
                        (qualified, value.to_owned())
                    })
                    .collect(),
            }),
            Node::Text(text) => NodeKind::Text(text.to_string()),
            Node::Comment(comment) => NodeKind::Comment(comment.to_string()),
            _ => continue,
        };

        let id = document.create(kind);
        document.append_child(parent, id);
        ids.insert(node.id(), id);
    }

    document
}

/// Serialize the whole tree back to markup.
pub fn serialize(document: &Document) -> String {
    let mut out = String::new();
    write_children(document, document.root(), &mut out);
    out
}

/// Serialize a single node and its subtree.
pub fn serialize_node(document: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(document, id, &mut out);
    out
}

fn write_children(document: &Document, id: NodeId, out: &mut String) {
    for child in document.children(id) {
        write_node(document, *child, out);
    }
}

fn write_node(document: &Document, id: NodeId, out: &mut String) {
    match document.kind(id) {
        NodeKind::Root => write_children(document, id, out),
        NodeKind::Doctype(doctype) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(&doctype.name);
            out.push('>');
        }
        NodeKind::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        NodeKind::Text(text) => {
            let raw = document
                .parent(id)
                .and_then(|parent| document.element(parent))
                .is_some_and(|parent| RAW_TEXT_ELEMENTS.contains(&parent.name.as_str()));
            if raw {
                out.push_str(text);
            } else {
                out.push_str(&encode_text(text));
            }
        }
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&element.name.as_str()) {
                return;
            }

            // The parser drops one newline right after these start tags.
            if NEWLINE_SENSITIVE_ELEMENTS.contains(&element.name.as_str()) {
                let leading_newline = document.children(id).first().is_some_and(|first| {
                    matches!(document.kind(*first), NodeKind::Text(text) if text.starts_with('\n'))
                });
                if leading_newline {
                    out.push('\n');
                }
            }

            write_children(document, id, out);
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }
    }
}
