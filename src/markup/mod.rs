//! Discovery and rewriting of embedded resource references.
//!
//! [`scan`] parses the fetched page once and returns the live document
//! together with every same-origin `<img src>`, stylesheet `<link href>` and
//! `<script src>` it contains, in document order. The orchestrator later
//! points those attributes at local copies through [`PageDocument`].

use ego_tree::NodeId;
use scraper::{Html, Node, StrTendril};
use tracing::{debug, trace};
use url::Url;

/// The kind of element a resource reference was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `<img src>`
    Image,
    /// `<link rel="stylesheet" href>`
    Stylesheet,
    /// `<script src>`
    Script,
}

impl ResourceKind {
    /// Name of the attribute holding the resource URL.
    #[must_use]
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Image | Self::Script => "src",
            Self::Stylesheet => "href",
        }
    }

    fn for_element(name: &str, rel: Option<&str>) -> Option<Self> {
        match name {
            "img" => Some(Self::Image),
            "script" => Some(Self::Script),
            "link" if rel.is_some_and(is_stylesheet_rel) => Some(Self::Stylesheet),
            _ => None,
        }
    }
}

/// A same-origin resource referenced from the page.
#[derive(Debug, Clone)]
pub struct ResourceReference {
    /// Attribute value as written in the markup.
    pub original_value: String,
    /// Absolute URL the value resolves to (fragment removed).
    pub resolved_url: Url,
    /// Element kind the reference came from.
    pub kind: ResourceKind,
    node: NodeId,
}

/// A parsed page that can be edited and serialized back to HTML.
///
/// Owned by a single control flow for the whole run; it is only mutated
/// after every resource has been fetched.
#[derive(Debug)]
pub struct PageDocument {
    html: Html,
}

impl PageDocument {
    /// Parses `text` as a full HTML document. Malformed markup is accepted.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// Replaces the URL attribute of the element behind `reference`.
    ///
    /// Returns `false` if the element no longer carries the attribute.
    pub fn set_reference_target(&mut self, reference: &ResourceReference, value: &str) -> bool {
        let attribute = reference.kind.attribute();
        let Some(mut node) = self.html.tree.get_mut(reference.node) else {
            return false;
        };
        let Node::Element(element) = node.value() else {
            return false;
        };

        for (name, current) in element.attrs.iter_mut() {
            if &*name.local == attribute {
                *current = StrTendril::from_slice(value);
                return true;
            }
        }
        false
    }

    /// Serializes the (possibly edited) document back to HTML text.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.html.html()
    }
}

/// Parses `html` and collects the same-origin resources it references.
///
/// The tree is walked once in document order. Each attribute value is
/// resolved against `page_url`; values that fail to resolve or point to
/// another origin are skipped and stay untouched in the markup.
#[must_use]
pub fn scan(page_url: &Url, html: &str) -> (PageDocument, Vec<ResourceReference>) {
    let document = PageDocument::parse(html);
    let page_origin = page_url.origin();
    let mut references = Vec::new();

    for node in document.html.tree.root().descendants() {
        let Some(element) = node.value().as_element() else {
            continue;
        };
        let Some(kind) = ResourceKind::for_element(element.name(), element.attr("rel")) else {
            continue;
        };
        let Some(value) = element.attr(kind.attribute()) else {
            continue;
        };

        let Some(resolved_url) = resolve_reference(page_url, value) else {
            debug!(value, "skipping unresolvable resource reference");
            continue;
        };
        if resolved_url.origin() != page_origin {
            trace!(url = %resolved_url, "skipping cross-origin resource");
            continue;
        }

        references.push(ResourceReference {
            original_value: value.to_string(),
            resolved_url,
            kind,
            node: node.id(),
        });
    }

    debug!(count = references.len(), "scanned page for resources");
    (document, references)
}

fn resolve_reference(page_url: &Url, value: &str) -> Option<Url> {
    let mut resolved = page_url.join(value.trim()).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

fn is_stylesheet_rel(rel: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|token| token.eq_ignore_ascii_case("stylesheet"))
}
