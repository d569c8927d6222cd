//! Owned snapshots of HTML forms
//!
//! Classification results must outlive the parsed document (which is dropped
//! before the next request), so forms are copied out into plain values.

use crate::dom::{self, selector};
use crate::url::resolve_link;
use scraper::{ElementRef, Html};
use url::Url;

/// A single `<input>` of a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub name: Option<String>,
    pub id: Option<String>,
    /// Lowercased `type` attribute; `None` when absent (browsers treat it as text)
    pub input_type: Option<String>,
    pub value: String,
}

impl InputField {
    fn from_element(element: ElementRef) -> Self {
        let value = element.value();
        Self {
            name: value.attr("name").map(str::to_string),
            id: value.attr("id").map(str::to_string),
            input_type: value.attr("type").map(|t| t.trim().to_ascii_lowercase()),
            value: value.attr("value").unwrap_or("").to_string(),
        }
    }

    pub fn is_type(&self, ty: &str) -> bool {
        self.input_type.as_deref() == Some(ty)
    }

    pub fn is_hidden(&self) -> bool {
        self.is_type("hidden")
    }

    pub fn is_password(&self) -> bool {
        self.is_type("password")
    }

    pub fn is_submit(&self) -> bool {
        self.is_type("submit")
    }

    /// Free-text input: `text`, `email`, or no type at all
    pub fn is_free_text(&self) -> bool {
        matches!(self.input_type.as_deref(), None | Some("text") | Some("email"))
    }

    /// Name if present, otherwise id
    pub fn name_or_id(&self) -> Option<&str> {
        self.name.as_deref().or(self.id.as_deref())
    }

    /// Lowercased name-or-id, empty when neither is set
    pub fn key_lower(&self) -> String {
        self.name_or_id().unwrap_or("").to_lowercase()
    }
}

/// A form and all of its inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInfo {
    pub id: Option<String>,
    pub class: Option<String>,
    pub action: Option<String>,
    /// Lowercased `method`; `None` when absent
    pub method: Option<String>,
    pub inputs: Vec<InputField>,
}

impl FormInfo {
    pub fn from_element(form: ElementRef) -> Self {
        let value = form.value();
        let inputs = form
            .select(&selector("input"))
            .map(InputField::from_element)
            .collect();

        Self {
            id: value.attr("id").map(str::to_string),
            class: value.attr("class").map(str::to_string),
            action: value.attr("action").map(str::to_string),
            method: value.attr("method").map(|m| m.trim().to_ascii_lowercase()),
            inputs,
        }
    }

    /// Action attribute, or the empty string
    pub fn action_str(&self) -> &str {
        self.action.as_deref().unwrap_or("")
    }

    /// Effective method; HTML defaults to GET
    pub fn is_get(&self) -> bool {
        self.method.as_deref().map_or(true, |m| m == "get")
    }

    /// Resolves the action against the page that hosted the form
    ///
    /// An empty or missing action submits back to the hosting page.
    pub fn resolve_action(&self, page_url: &Url) -> Url {
        let action = self.action_str().trim();
        if action.is_empty() {
            return page_url.clone();
        }
        resolve_link(action, page_url).unwrap_or_else(|| page_url.clone())
    }

    /// Named inputs
    pub fn named_inputs(&self) -> impl Iterator<Item = (&str, &InputField)> {
        self.inputs
            .iter()
            .filter_map(|i| i.name.as_deref().map(|n| (n, i)))
    }

    pub fn has_input_named(&self, name: &str) -> bool {
        self.named_inputs().any(|(n, _)| n == name)
    }

    pub fn has_password(&self) -> bool {
        self.inputs.iter().any(InputField::is_password)
    }

    /// Every named, non-submit input with its page-supplied value
    ///
    /// Order follows the document, which is the order browsers submit in.
    pub fn replay_payload(&self) -> Vec<(String, String)> {
        self.named_inputs()
            .filter(|(_, input)| !input.is_submit())
            .map(|(name, input)| (name.to_string(), input.value.clone()))
            .collect()
    }

    /// Hidden inputs with their values
    pub fn hidden_payload(&self) -> Vec<(String, String)> {
        self.named_inputs()
            .filter(|(_, input)| input.is_hidden())
            .map(|(name, input)| (name.to_string(), input.value.clone()))
            .collect()
    }
}

/// Every form in the document, in document order
pub fn forms(document: &Html) -> Vec<FormInfo> {
    document
        .select(&selector("form"))
        .map(FormInfo::from_element)
        .collect()
}

/// First `<input name=...>` anywhere in the document
pub fn find_input_value(document: &Html, name: &str) -> Option<String> {
    dom::all_elements(document)
        .filter(|e| e.value().name() == "input")
        .find(|e| e.value().attr("name") == Some(name))
        .map(|e| dom::attr(e, "value").to_string())
}

/// Sets a payload field, replacing an existing entry of the same name
pub fn set_field(payload: &mut Vec<(String, String)>, name: &str, value: &str) {
    match payload.iter_mut().find(|(n, _)| n == name) {
        Some(entry) => entry.1 = value.to_string(),
        None => payload.push((name.to_string(), value.to_string())),
    }
}
