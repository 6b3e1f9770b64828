//! Inputs and their text fields, as listed in the state document.

use crate::document::{Element, ServerInfo};
use indexmap::IndexMap;
use serde::Serialize;

/// A mixer input (camera, title, clip, colour, ...).
///
/// Every attribute the mixer reports on the `<input>` element is kept, in document order.
/// The accessors cover the attributes that are present on every input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Input {
    #[serde(flatten)]
    pub attributes: IndexMap<String, String>,
    /// Text fields of a title input, in document order. Empty for other input types.
    pub text: Vec<TextField>,
}

impl Input {
    pub fn from_element(element: &Element) -> Self {
        Self {
            attributes: element.attributes.clone(),
            text: element
                .children_named("text")
                .map(TextField::from_element)
                .collect(),
        }
    }

    /// The input's GUID, which is what `Input=` expects.
    pub fn key(&self) -> Option<&str> {
        self.attr("key")
    }

    /// The one-based position of the input in the mixer's input list.
    pub fn number(&self) -> Option<&str> {
        self.attr("number")
    }

    /// The input type, e.g. `GT`, `Capture` or `Colour`.
    pub fn kind(&self) -> Option<&str> {
        self.attr("type")
    }

    pub fn title(&self) -> Option<&str> {
        self.attr("title")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Looks up a text field by its `name` attribute.
    pub fn text_field(&self, name: &str) -> Option<&TextField> {
        self.text.iter().find(|t| t.name() == Some(name))
    }
}

/// One settable text slot on a title input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextField {
    #[serde(flatten)]
    pub attributes: IndexMap<String, String>,
    /// The text currently shown in the field.
    pub value: String,
}

impl TextField {
    pub fn from_element(element: &Element) -> Self {
        Self {
            attributes: element.attributes.clone(),
            value: element.text.clone(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.attr("name")
    }

    pub fn index(&self) -> Option<u64> {
        self.attr("index")?.parse().ok()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Collects every input in the document, in document order.
pub fn inputs_of(info: &ServerInfo) -> Vec<Input> {
    info.input_elements().map(Input::from_element).collect()
}
