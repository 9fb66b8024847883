//! Generic XML decoding into an attributed tree.
//!
//! OOXML parts use deeply nested, sparsely populated schemas. Rather than
//! maintaining a grammar per part, every part is decoded into the same
//! [`XmlElement`] tree and part parsers pick out only the fields they need.
//!
//! All element lookups match the *local* name and ignore the namespace
//! prefix, so `child("sp")` finds `<p:sp>` as well as `<sp>`. Decks written
//! by different producers disagree on prefixes often enough that this is the
//! only reliable behavior.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Number, Value};

/// Reserved key prefix for attributes in the map view.
pub const ATTRIBUTE_PREFIX: &str = "@";

/// Reserved key for text content in the map view.
pub const TEXT_KEY: &str = "#text";

/// A node of the generic tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// A nested element
    Element(XmlElement),
    /// Character data (entities already unescaped)
    Text(String),
}

/// An element with its qualified name, attributes, and children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Qualified tag name as written in the part (e.g., "p:sp")
    pub name: String,
    /// Attributes in document order, keyed by qualified name
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

/// Strip a namespace prefix from a qualified name.
pub fn local_name(name: &str) -> &str {
    match name.rfind(':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

impl XmlElement {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Local part of the tag name.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Whether this element's local name matches `name`'s local name.
    pub fn is(&self, name: &str) -> bool {
        self.local_name() == local_name(name)
    }

    /// Iterate over child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(name))
    }

    /// All child elements with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.is(name))
    }

    /// Follow a chain of child names from this element.
    pub fn path(&self, names: &[&str]) -> Option<&XmlElement> {
        let mut current = self;
        for name in names {
            current = current.child(name)?;
        }
        Some(current)
    }

    /// Whether a child element with the given local name exists.
    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Look up an attribute.
    ///
    /// An exact qualified match wins. An unprefixed query (`"id"`) then
    /// falls back to any attribute with that local name; a prefixed query
    /// (`"r:id"`) falls back only to other *prefixed* attributes with the
    /// same local name, so `r:id` never resolves to a plain `id`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        if let Some((_, v)) = self.attributes.iter().find(|(k, _)| k == name) {
            return Some(v.as_str());
        }
        let wanted = local_name(name);
        let prefixed = name.contains(':');
        self.attributes
            .iter()
            .find(|(k, _)| local_name(k) == wanted && (!prefixed || k.contains(':')))
            .map(|(_, v)| v.as_str())
    }

    /// Attribute coerced to an integer.
    ///
    /// Absence is `Ok(None)`; a present value that does not parse is an
    /// [`Error::InvalidData`].
    pub fn attr_i64(&self, name: &str) -> Result<Option<i64>> {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<i64>().map(Some).map_err(|_| {
                Error::InvalidData(format!(
                    "attribute {}@{} is not an integer: {:?}",
                    self.local_name(),
                    name,
                    raw
                ))
            }),
        }
    }

    /// Percentage attribute in thousandths of a percent (`50000` = 50%).
    ///
    /// Also accepts the strict OOXML literal form (`"50%"`, `"12.5%"`).
    pub fn attr_percent(&self, name: &str) -> Result<Option<i64>> {
        let Some(raw) = self.attr(name) else {
            return Ok(None);
        };
        let Some(literal) = raw.trim().strip_suffix('%') else {
            return self.attr_i64(name);
        };
        match literal.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some((v * 1000.0).round() as i64)),
            _ => Err(Error::InvalidData(format!(
                "attribute {}@{} is not a percentage: {:?}",
                self.local_name(),
                name,
                raw
            ))),
        }
    }

    /// Attribute coerced to a float.
    pub fn attr_f64(&self, name: &str) -> Result<Option<f64>> {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                _ => Err(Error::InvalidData(format!(
                    "attribute {}@{} is not a number: {:?}",
                    self.local_name(),
                    name,
                    raw
                ))),
            },
        }
    }

    /// Attribute coerced to a boolean (`1`, `true`, `on` / `0`, `false`, `off`).
    pub fn attr_bool(&self, name: &str) -> Result<Option<bool>> {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => match raw.trim() {
                "1" | "true" | "on" => Ok(Some(true)),
                "0" | "false" | "off" => Ok(Some(false)),
                _ => Err(Error::InvalidData(format!(
                    "attribute {}@{} is not a boolean: {:?}",
                    self.local_name(),
                    name,
                    raw
                ))),
            },
        }
    }

    /// Boolean attribute, treating absent or unparseable values as `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.attr_bool(name).ok().flatten().unwrap_or(false)
    }

    /// Concatenated direct text content of this element.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let XmlNode::Text(t) = node {
                out.push_str(t);
            }
        }
        out
    }

    /// Render this element as the generic map view.
    ///
    /// Attributes become `@name` keys with numeric and boolean values
    /// coerced; text becomes a `#text` key; a tag that repeats becomes an
    /// array of its occurrences in document order.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (key, raw) in &self.attributes {
            map.insert(format!("{}{}", ATTRIBUTE_PREFIX, key), coerce_attribute(raw));
        }

        let text = self.text();
        if !text.is_empty() {
            map.insert(TEXT_KEY.to_string(), Value::String(text));
        }

        for child in self.elements() {
            let value = child.to_value();
            // Element values are always objects, so an array here can only
            // be an earlier repeat of the same tag.
            match map.get_mut(&child.name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(child.name.clone(), value);
                }
            }
        }

        Value::Object(map)
    }
}

fn coerce_attribute(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

fn malformed(offset: u64, message: impl Into<String>) -> Error {
    Error::MalformedXml {
        offset,
        message: message.into(),
    }
}

fn start_element(e: &BytesStart<'_>, offset: u64) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(offset, err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(offset, err.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Drop whitespace-only text between child elements (indentation), while
/// keeping text in leaf elements such as `<a:t> </a:t>` intact.
fn finish_element(mut element: XmlElement) -> XmlElement {
    let has_elements = element
        .children
        .iter()
        .any(|n| matches!(n, XmlNode::Element(_)));
    if has_elements {
        element
            .children
            .retain(|n| !matches!(n, XmlNode::Text(t) if t.trim().is_empty()));
    }
    element
}

/// Decode an XML document into its root element.
///
/// Fails with [`Error::MalformedXml`] on syntax errors, mismatched or
/// unclosed tags, an empty document, or content after the root element.
pub fn decode(text: &str) -> Result<XmlElement> {
    let mut reader = quick_xml::Reader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let offset = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|err| malformed(reader.error_position() as u64, err.to_string()))?;

        match event {
            Event::Start(ref e) => {
                if root.is_some() {
                    return Err(malformed(offset, "content after root element"));
                }
                stack.push(start_element(e, offset)?);
            }
            Event::Empty(ref e) => {
                if root.is_some() {
                    return Err(malformed(offset, "content after root element"));
                }
                let element = start_element(e, offset)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed(offset, "unexpected closing tag"))?;
                let element = finish_element(element);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None => root = Some(element),
                }
            }
            Event::Text(ref e) => {
                let content = e
                    .unescape()
                    .map_err(|err| malformed(offset, err.to_string()))?;
                match stack.last_mut() {
                    Some(parent) => {
                        if !content.is_empty() {
                            parent.children.push(XmlNode::Text(content.into_owned()));
                        }
                    }
                    None if content.trim().is_empty() => {}
                    None => return Err(malformed(offset, "text outside root element")),
                }
            }
            Event::CData(e) => {
                let content = String::from_utf8_lossy(&e.into_inner()).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Text(content)),
                    None => return Err(malformed(offset, "CDATA outside root element")),
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(
            reader.buffer_position() as u64,
            format!("unclosed element <{}>", open.name),
        ));
    }

    root.ok_or_else(|| malformed(0, "document has no root element"))
}
