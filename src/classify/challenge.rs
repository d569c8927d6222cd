//! Two-factor challenge detection

use crate::classify::form::FormInfo;
use crate::classify::glossary::FieldGlossary;
use crate::dom;
use scraper::{ElementRef, Html};
use url::Url;

fn code_inputs<'a>(
    document: &'a Html,
    glossary: &'a FieldGlossary,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    dom::all_elements(document)
        .filter(|e| e.value().name() == "input")
        .filter(|e| {
            matches!(
                e.value().attr("type").map(|t| t.trim().to_ascii_lowercase()).as_deref(),
                Some("text") | Some("number")
            )
        })
        .filter(move |e| {
            let key = e
                .value()
                .attr("name")
                .or_else(|| e.value().attr("id"))
                .unwrap_or("")
                .to_lowercase();
            glossary.is_code_like(&key)
        })
}

/// True if the page asks for a one-time code
///
/// Either the URL mentions a one-time-code flow, or a text/number input is
/// named like a code field.
pub fn is_challenge_page(url: &Url, document: &Html, glossary: &FieldGlossary) -> bool {
    let url_lower = url.as_str().to_lowercase();
    if glossary
        .challenge_url_hints
        .iter()
        .any(|h| url_lower.contains(h.as_str()))
    {
        return true;
    }

    code_inputs(document, glossary).next().is_some()
}

/// Name (or id) of the input the one-time code goes into
pub fn find_code_field(document: &Html, glossary: &FieldGlossary) -> Option<String> {
    code_inputs(document, glossary).next().and_then(|e| {
        e.value()
            .attr("name")
            .or_else(|| e.value().attr("id"))
            .map(str::to_string)
    })
}

/// The form that carries the code field, or the page's first form
pub fn challenge_form(forms: &[FormInfo], code_field: &str) -> Option<FormInfo> {
    forms
        .iter()
        .find(|f| {
            f.inputs
                .iter()
                .any(|i| i.name_or_id() == Some(code_field))
        })
        .or_else(|| forms.first())
        .cloned()
}

/// Builds the code submission: every named input replayed, code field set
pub fn build_code_payload(form: &FormInfo, code_field: &str, code: &str) -> Vec<(String, String)> {
    let mut payload: Vec<(String, String)> = form
        .named_inputs()
        .map(|(name, input)| {
            let value = if name == code_field {
                code.to_string()
            } else {
                input.value.clone()
            };
            (name.to_string(), value)
        })
        .collect();

    if !payload.iter().any(|(n, _)| n == code_field) {
        payload.push((code_field.to_string(), code.to_string()));
    }

    payload
}
