use tracing::trace;

use crate::dom::{Document, NodeId};
use crate::marker::match_marker;

pub const CALLOUT_CLASS: &str = "callout";
pub const CALLOUT_TITLE_CLASS: &str = "callout-title";

const BLOCKQUOTE: &str = "blockquote";
const FIRST_BLOCK_NAMES: &[&str] = &["p", "div"];
const TITLE_ELEMENT: &str = "div";

/// A blockquote that was turned into a callout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callout {
    pub blockquote: NodeId,
    pub title_element: NodeId,
    pub kind: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnhanceReport {
    pub callouts: Vec<Callout>,
}

impl EnhanceReport {
    pub fn is_empty(&self) -> bool {
        self.callouts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.callouts.len()
    }
}

/// Rewrites `[!type]` blockquotes into titled callouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalloutEnhancer;

impl CalloutEnhancer {
    pub fn new() -> Self {
        Self
    }

    /// Enhance every blockquote below `scope`, in document order.
    ///
    /// The blockquote list is collected before anything is mutated. A
    /// blockquote without a `p`/`div` descendant, or whose first such
    /// descendant does not start with a marker, is left exactly as it was.
    pub fn enhance(&self, document: &mut Document, scope: NodeId) -> EnhanceReport {
        let mut report = EnhanceReport::default();
        for blockquote in document.elements_by_name(scope, BLOCKQUOTE) {
            if let Some(callout) = self.enhance_blockquote(document, blockquote) {
                report.callouts.push(callout);
            }
        }
        report
    }

    fn enhance_blockquote(&self, document: &mut Document, blockquote: NodeId) -> Option<Callout> {
        let first = document.first_descendant_by_names(blockquote, FIRST_BLOCK_NAMES)?;
        let text = document.text_content(first);
        let marker = match_marker(&text)?;
        // Title goes before the blockquote child that holds `first`, which is
        // `first` itself in the common case.
        let anchor = document.child_containing(blockquote, first)?;

        document.set_text_content(first, marker.remainder(&text));
        document.add_class(blockquote, CALLOUT_CLASS);
        document.add_class(blockquote, &format!("{CALLOUT_CLASS}-{}", marker.kind));

        let title_element = document.create_element(TITLE_ELEMENT);
        document.set_attr(title_element, "class", CALLOUT_TITLE_CLASS);
        document.set_text_content(title_element, &marker.title);
        document.insert_before(blockquote, title_element, anchor);

        trace!(kind = %marker.kind, title = %marker.title, "enhanced callout");

        Some(Callout {
            blockquote,
            title_element,
            kind: marker.kind,
            title: marker.title,
        })
    }
}

/// Shorthand for `CalloutEnhancer::new().enhance(document, scope)`.
pub fn enhance(document: &mut Document, scope: NodeId) -> EnhanceReport {
    CalloutEnhancer::new().enhance(document, scope)
}
