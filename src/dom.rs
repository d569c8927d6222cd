//! Small DOM helpers over `scraper` shared by the classifier and extractors

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Builds a selector from a literal that is known to be valid
///
/// Falls back to a selector that matches nothing if the literal is rejected,
/// so callers never need to handle a parse error for their own constants.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css)
        .or_else(|_| Selector::parse(":not(*)"))
        .unwrap_or_else(|_| unreachable!("fallback selector is valid"))
}

/// Text of an element with each text node trimmed and joined without spaces
pub(crate) fn stripped_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Raw concatenated text of an element
pub(crate) fn raw_text(element: ElementRef) -> String {
    element.text().collect()
}

/// Attribute value, or the empty string
pub(crate) fn attr<'a>(element: ElementRef<'a>, name: &str) -> &'a str {
    element.value().attr(name).unwrap_or("")
}

/// True if the element's `class` attribute matches the pattern
pub(crate) fn class_matches(element: ElementRef, pattern: &Regex) -> bool {
    element
        .value()
        .attr("class")
        .map(|c| pattern.is_match(c))
        .unwrap_or(false)
}

/// True if the element's tag name is one of `names`
pub(crate) fn is_one_of(element: ElementRef, names: &[&str]) -> bool {
    names.contains(&element.value().name())
}

/// Element ancestors, nearest first (the element itself excluded)
pub(crate) fn ancestors<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.ancestors().filter_map(ElementRef::wrap)
}

/// Element descendants in document order (the element itself excluded)
pub(crate) fn descendants<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// Every element in the document, in document order
pub(crate) fn all_elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.root_element().descendants().filter_map(ElementRef::wrap)
}
