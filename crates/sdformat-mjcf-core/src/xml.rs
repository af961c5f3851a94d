//! Minimal XML element tree
//!
//! Both SDFormat and MJCF are read into this tree first. MJCF default classes
//! are applied on the tree before typed parsing.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Errors raised while reading or writing XML
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("XML document has no root element")]
    Empty,

    #[error("Invalid value '{value}' for attribute '{attribute}' of <{element}>")]
    BadAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    #[error("Invalid value '{value}' in <{element}>")]
    BadText { element: String, value: String },

    #[error("<{parent}> is missing required element <{child}>")]
    MissingElement { parent: String, child: String },

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("Failed to write XML: {0}")]
    Write(String),
}

/// An XML element with ordered attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: Option<String>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Leaf element holding text, e.g. `<mass>1</mass>`
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Parse a document and return its root element
    pub fn parse(xml: &str) -> Result<XmlElement, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| XmlError::Malformed(format!("{} at byte {}", e, reader.buffer_position())))?;
            match event {
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlError::Malformed("unbalanced closing tag".to_string()))?;
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|e| XmlError::Malformed(e.to_string()))?;
                    append_text(&mut stack, &value);
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data).to_string();
                    append_text(&mut stack, &value);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::Malformed(format!(
                "unclosed element <{}>",
                stack.last().map(|e| e.name.as_str()).unwrap_or_default()
            )));
        }
        root.ok_or(XmlError::Empty)
    }

    /// Raw attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set (or replace) an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Builder form of [`set_attr`](Self::set_attr)
    pub fn attr_set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn attr_f64(&self, name: &str) -> Result<Option<f64>, XmlError> {
        self.attr(name)
            .map(|value| {
                value.trim().parse::<f64>().map_err(|_| self.bad_attribute(name, value))
            })
            .transpose()
    }

    pub fn attr_i32(&self, name: &str) -> Result<Option<i32>, XmlError> {
        self.attr(name)
            .map(|value| {
                value.trim().parse::<i32>().map_err(|_| self.bad_attribute(name, value))
            })
            .transpose()
    }

    /// Boolean attribute accepting `true/false` and `1/0`
    pub fn attr_bool(&self, name: &str) -> Result<Option<bool>, XmlError> {
        self.attr(name)
            .map(|value| parse_bool(value).ok_or_else(|| self.bad_attribute(name, value)))
            .transpose()
    }

    /// Whitespace-separated list of numbers
    pub fn attr_vec(&self, name: &str) -> Result<Option<Vec<f64>>, XmlError> {
        self.attr(name)
            .map(|value| parse_numbers(value).ok_or_else(|| self.bad_attribute(name, value)))
            .transpose()
    }

    /// Exactly `N` numbers
    pub fn attr_array<const N: usize>(&self, name: &str) -> Result<Option<[f64; N]>, XmlError> {
        match self.attr_vec(name)? {
            None => Ok(None),
            Some(values) => {
                let value = self.attr(name).unwrap_or_default();
                values
                    .try_into()
                    .map(Some)
                    .map_err(|_| self.bad_attribute(name, value))
            }
        }
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_deref().unwrap_or(""))
    }

    pub fn child_f64(&self, name: &str) -> Result<Option<f64>, XmlError> {
        self.child(name).map(|c| c.text_f64()).transpose()
    }

    pub fn child_bool(&self, name: &str) -> Result<Option<bool>, XmlError> {
        self.child(name)
            .map(|c| {
                let text = c.text.as_deref().unwrap_or("");
                parse_bool(text).ok_or_else(|| c.bad_text(text))
            })
            .transpose()
    }

    pub fn child_array<const N: usize>(&self, name: &str) -> Result<Option<[f64; N]>, XmlError> {
        self.child(name).map(|c| c.text_array::<N>()).transpose()
    }

    /// Required child element
    pub fn required_child(&self, name: &str) -> Result<&XmlElement, XmlError> {
        self.child(name).ok_or_else(|| XmlError::MissingElement {
            parent: self.name.clone(),
            child: name.to_string(),
        })
    }

    /// Required attribute
    pub fn required_attr(&self, name: &str) -> Result<&str, XmlError> {
        self.attr(name).ok_or_else(|| XmlError::MissingAttribute {
            element: self.name.clone(),
            attribute: name.to_string(),
        })
    }

    pub fn text_f64(&self) -> Result<f64, XmlError> {
        let text = self.text.as_deref().unwrap_or("");
        text.trim().parse::<f64>().map_err(|_| self.bad_text(text))
    }

    pub fn text_vec(&self) -> Result<Vec<f64>, XmlError> {
        let text = self.text.as_deref().unwrap_or("");
        parse_numbers(text).ok_or_else(|| self.bad_text(text))
    }

    pub fn text_array<const N: usize>(&self) -> Result<[f64; N], XmlError> {
        let text = self.text.as_deref().unwrap_or("");
        self.text_vec()?.try_into().map_err(|_| self.bad_text(text))
    }

    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Builder form of [`push_child`](Self::push_child)
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Serialize with an XML declaration and two-space indentation
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
            .map_err(|e| XmlError::Write(e.to_string()))?;
        write_element(&mut writer, self)?;
        let mut out = String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }

    fn bad_attribute(&self, attribute: &str, value: &str) -> XmlError {
        XmlError::BadAttribute {
            element: self.name.clone(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }

    fn bad_text(&self, value: &str) -> XmlError {
        XmlError::BadText {
            element: self.name.clone(),
            value: value.to_string(),
        }
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let mut element = XmlElement::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| XmlError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| XmlError::Malformed(e.to_string()))?
            .to_string();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn close_element(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_some() {
                return Err(XmlError::Malformed("multiple root elements".to_string()));
            }
            *root = Some(element);
        }
    }
    Ok(())
}

fn append_text(stack: &mut [XmlElement], value: &str) {
    if let Some(current) = stack.last_mut() {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }
        match &mut current.text {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(trimmed);
            }
            None => current.text = Some(trimmed.to_string()),
        }
    }
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_none() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmlError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError::Write(e.to_string()))?;
    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| XmlError::Write(e.to_string()))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| XmlError::Write(e.to_string()))
}

fn parse_numbers(text: &str) -> Option<Vec<f64>> {
    text.split_whitespace().map(|t| t.parse::<f64>().ok()).collect()
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Format a number for XML output.
///
/// At most nine fractional digits; trailing zeros and `-0` are dropped.
pub fn format_f64(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let mut s = format!("{:.9}", value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Space-separated list of numbers
pub fn format_list(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_f64(*v))
        .collect::<Vec<_>>()
        .join(" ")
}
