//! Message and element types.

use serde_json::Value;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Event type emitted for every page view.
pub const EVENT_PAGEVIEW: &str = "$pageview";

/// Event type emitted for every tracked click.
pub const EVENT_CLICK: &str = "$click";

/// Flat attribute map carried by one event.
///
/// Values are scalars only; the whole map is flattened into URL-encoded
/// key/value pairs on the wire, which is all either transport can carry.
/// There is no nesting and no field-ordering guarantee.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message(BTreeMap<String, Value>);

impl Message {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one attribute, overwriting any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up an attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Copy every attribute of `other` into this message, `other` winning
    /// on key collisions.
    pub fn extend(&mut self, other: &Message) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over attributes in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Flatten into key/value string pairs for the wire.
    ///
    /// Strings are carried verbatim; other scalars use their JSON rendering.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), scalar_to_string(v)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Message {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut message = Message::new();
        for (k, v) in iter {
            message.insert(k, v);
        }
        message
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One element of a composed click dispatch path, event target first.
///
/// Hosts translate their DOM (or DOM-like) nodes into descriptors; the
/// tracker never touches a real document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementDescriptor {
    /// Tag name; matched case-insensitively.
    pub tag: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub classes: Vec<String>,
    /// Resolved absolute href for anchors, as the platform reports it.
    pub href: Option<String>,
    /// Anchor `target` attribute.
    pub target: Option<String>,
    /// Whether the element carries a `download` attribute.
    pub download: bool,
    /// Visible text content, untrimmed.
    pub text: Option<String>,
}

impl ElementDescriptor {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_download(mut self) -> Self {
        self.download = true;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Case-insensitive tag comparison, the way DOM tag names behave.
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}
