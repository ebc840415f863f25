//! Minimal element tree built from quick-xml events.
//!
//! The scene format only uses elements and attributes, so text, comments and
//! processing instructions are dropped while building the tree.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, SceneError};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `name` attribute of a property node, or `""`.
    pub fn property_name(&self) -> &str {
        self.attr("name").unwrap_or("")
    }

    /// The `value` attribute of a property node, or `""`.
    pub fn value(&self) -> &str {
        self.attr("value").unwrap_or("")
    }

    /// First child element with the given tag.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Value of the last `<kind name="name" value="..."/>` child.
    pub fn property(&self, kind: &str, name: &str) -> Option<&str> {
        self.children
            .iter()
            .rev()
            .find(|c| c.name == kind && c.property_name() == name)
            .map(Element::value)
    }

    /// Replace `$name` in every attribute of this subtree.
    fn substitute(&mut self, defaults: &[(String, String)]) {
        for (_, value) in self.attributes.iter_mut() {
            if !value.contains('$') {
                continue;
            }
            for (name, replacement) in defaults {
                *value = value.replace(&format!("${name}"), replacement);
            }
        }
        for child in self.children.iter_mut() {
            child.substitute(defaults);
        }
    }
}

/// Parse a document into its root element.
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(element_from(&e)?),
            Event::Empty(e) => {
                let element = element_from(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(e) => {
                let element = stack.pop().ok_or_else(|| {
                    SceneError::Document(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ))
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(SceneError::Document(format!(
            "unclosed element <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| SceneError::Document("document has no root element".into()))
}

/// Apply root-level `<default name=".." value=".."/>` entries to every
/// attribute in the tree.
pub fn substitute_defaults(root: &mut Element) {
    let mut defaults: HashMap<String, String> = HashMap::new();
    for node in root.children_named("default") {
        defaults.insert(node.property_name().to_string(), node.value().to_string());
    }
    if defaults.is_empty() {
        return;
    }

    // Longest names first so `$spp` never clobbers `$spp_max`.
    let mut ordered: Vec<(String, String)> = defaults.into_iter().collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
    root.substitute(&ordered);
}

fn element_from(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(SceneError::Document(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}
