pub mod dom;
mod enhancer;
mod html;
mod marker;

pub use dom::{Doctype, Document, ElementData, NodeId, NodeKind};
pub use enhancer::{
    enhance, Callout, CalloutEnhancer, EnhanceReport, CALLOUT_CLASS, CALLOUT_TITLE_CLASS,
};
pub use html::{is_full_document, parse_html, serialize, serialize_node};
pub use marker::{default_title, match_marker, MarkerMatch};

use tracing::debug;

/// Parse `source`, enhance every callout in it, and serialize the result.
pub fn enhance_html(source: &str) -> (String, EnhanceReport) {
    let mut document = parse_html(source);
    let root = document.root();
    let report = enhance(&mut document, root);
    debug!(callouts = report.len(), "enhanced html");
    (serialize(&document), report)
}
