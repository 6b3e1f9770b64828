//! Query-string construction for vMix function calls.
//!
//! Every control call against the web API is a `GET /api/?Function=<Name>&...` request. The
//! parameters are kept in an ordered [`Options`] set and serialized verbatim, without
//! percent-encoding, since that is what the mixer has always been sent by this client.

use indexmap::IndexMap;
use std::fmt;
use std::time::Duration;

/// Functions of the vMix web API that this client issues.
///
/// See: <https://www.vmix.com/help17/index.htm?DeveloperAPI.html>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Function {
    SetText,
    StartCountdown,
    StopCountdown,
    PauseCountdown,
    SetCountdown,
    AdjustCountdown,
}

impl Function {
    /// The name the mixer expects in the `Function` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Function::SetText => "SetText",
            Function::StartCountdown => "StartCountdown",
            Function::StopCountdown => "StopCountdown",
            Function::PauseCountdown => "PauseCountdown",
            Function::SetCountdown => "SetCountdown",
            Function::AdjustCountdown => "AdjustCountdown",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of query parameters.
///
/// Insertion order is preserved when serializing. Inserting a key that is already present
/// replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(IndexMap<String, String>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a parameter set for calling `function` on the given input.
    pub fn for_input(function: Function, input: impl Into<String>) -> Self {
        Self::new()
            .with("Function", function.as_str())
            .with("Input", input)
    }

    /// Builder-style [`Options::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key` to `value`, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Equivalent to [`build_query_string`].
    pub fn to_query_string(&self) -> String {
        build_query_string(self)
    }
}

impl<K, V> FromIterator<(K, V)> for Options
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.iter().enumerate() {
            if i != 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Joins `key=value` pairs with `&`, in insertion order.
///
/// Keys and values are passed through as-is. A value containing `&` or `=` therefore produces
/// a query string the mixer will split differently than intended.
pub fn build_query_string(options: &Options) -> String {
    options.to_string()
}

/// Splits a query string produced by [`build_query_string`] back into its pairs.
///
/// Pairs are separated by `&` and split on their first `=`. A pair without `=` maps to an
/// empty value. No percent-decoding is performed.
pub fn parse_query_string(query: &str) -> Options {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect()
}

/// Identifies a text field on a title input.
///
/// The mixer addresses fields either by zero-based index (`SelectedIndex`) or by name
/// (`SelectedName`, e.g. `Message.Text`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextFieldSelector {
    Index(u64),
    Name(String),
}

impl TextFieldSelector {
    /// Classifies a selector string.
    ///
    /// A non-empty string of ASCII digits is an index, anything else is a name.
    pub fn parse(selector: &str) -> Self {
        if !selector.is_empty() && selector.bytes().all(|b| b.is_ascii_digit()) {
            // digit strings too long for u64 can only be names
            if let Ok(index) = selector.parse() {
                return TextFieldSelector::Index(index);
            }
        }
        TextFieldSelector::Name(selector.to_string())
    }

    /// The query parameter this selector is sent as.
    pub fn parameter(&self) -> &'static str {
        match self {
            TextFieldSelector::Index(_) => "SelectedIndex",
            TextFieldSelector::Name(_) => "SelectedName",
        }
    }

    pub(crate) fn value(&self) -> String {
        match self {
            TextFieldSelector::Index(i) => i.to_string(),
            TextFieldSelector::Name(name) => name.clone(),
        }
    }
}

impl From<&str> for TextFieldSelector {
    fn from(selector: &str) -> Self {
        Self::parse(selector)
    }
}

impl From<String> for TextFieldSelector {
    fn from(selector: String) -> Self {
        Self::parse(&selector)
    }
}

impl From<u64> for TextFieldSelector {
    fn from(index: u64) -> Self {
        TextFieldSelector::Index(index)
    }
}

/// Formats a duration as the `hh:mm:ss` value `SetCountdown` expects.
///
/// Sub-second precision is truncated. Hours are not wrapped at 24.
pub fn countdown_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}
