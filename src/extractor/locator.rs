//! Tag lookup inside a parsed page.
//!
//! A [`NodeSelector`] is a tag name plus attribute filters. [`find`] returns
//! the first matching descendant in document order and fails with
//! [`SchemaMismatch`] when there is none; [`find_all`] returns every match
//! and may be empty.

use regex::Regex;
use scraper::ElementRef;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// How a single attribute value is matched.
#[derive(Debug, Clone)]
pub enum AttrMatch {
    Exact(String),
    /// Unanchored search, like `Regex::is_match`.
    Pattern(Regex),
}

impl AttrMatch {
    fn matches(&self, candidate: &str) -> bool {
        match self {
            AttrMatch::Exact(expected) => expected == candidate,
            AttrMatch::Pattern(pattern) => pattern.is_match(candidate),
        }
    }
}

impl Display for AttrMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AttrMatch::Exact(value) => write!(f, "=\"{}\"", value),
            AttrMatch::Pattern(pattern) => write!(f, "~/{}/", pattern.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeSelector {
    tag: String,
    attrs: Vec<(String, AttrMatch)>,
}

impl NodeSelector {
    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            tag: name.into(),
            attrs: Vec::new(),
        }
    }

    /// Require `name` to equal `value`.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), AttrMatch::Exact(value.into())));
        self
    }

    /// Require `name` to contain a match for `pattern`.
    pub fn attr_pattern(mut self, name: impl Into<String>, pattern: Regex) -> Self {
        self.attrs.push((name.into(), AttrMatch::Pattern(pattern)));
        self
    }

    pub fn matches(&self, element: ElementRef<'_>) -> bool {
        let value = element.value();
        if !value.name().eq_ignore_ascii_case(&self.tag) {
            return false;
        }
        self.attrs.iter().all(|(name, expected)| {
            let Some(actual) = value.attr(name) else {
                return false;
            };
            if expected.matches(actual) {
                return true;
            }
            // class is multi-valued: any single class name may match
            name == "class" && actual.split_ascii_whitespace().any(|class| expected.matches(class))
        })
    }
}

impl Display for NodeSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, expected) in &self.attrs {
            write!(f, " {}{}", name, expected)?;
        }
        write!(f, ">")
    }
}

/// An expected node is absent: the page no longer has the structure the
/// selectors were written for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no {selector} found within {scope}")]
pub struct SchemaMismatch {
    pub selector: String,
    pub scope: String,
}

impl SchemaMismatch {
    pub fn new(selector: impl Display, scope: ElementRef<'_>) -> Self {
        Self {
            selector: selector.to_string(),
            scope: describe(scope),
        }
    }
}

/// Short description of an element for diagnostics, e.g. `<div class="body">`.
pub fn describe(element: ElementRef<'_>) -> String {
    let value = element.value();
    let mut out = format!("<{}", value.name());
    for name in ["id", "class", "role"] {
        if let Some(attr) = value.attr(name) {
            out.push_str(&format!(" {}=\"{}\"", name, attr));
        }
    }
    out.push('>');
    out
}

fn descendants<'a>(scope: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    // descendants() starts with the scope node itself
    scope.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// First descendant of `scope` matching `selector`, in document order.
pub fn find<'a>(
    scope: ElementRef<'a>,
    selector: &NodeSelector,
) -> Result<ElementRef<'a>, SchemaMismatch> {
    descendants(scope)
        .find(|element| selector.matches(*element))
        .ok_or_else(|| SchemaMismatch::new(selector, scope))
}

/// Every descendant of `scope` matching `selector`, in document order.
pub fn find_all<'a>(scope: ElementRef<'a>, selector: &NodeSelector) -> Vec<ElementRef<'a>> {
    descendants(scope)
        .filter(|element| selector.matches(*element))
        .collect()
}

/// Attribute that the page structure guarantees; absence is a schema mismatch.
pub fn required_attr<'a>(element: ElementRef<'a>, name: &str) -> Result<&'a str, SchemaMismatch> {
    element.value().attr(name).ok_or_else(|| SchemaMismatch {
        selector: format!("{} attribute", name),
        scope: describe(element),
    })
}
