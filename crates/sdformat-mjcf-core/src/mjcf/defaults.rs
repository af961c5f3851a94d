//! MJCF default classes
//!
//! The top-level `<default>` is the `main` class; every nested
//! `<default class="...">` starts from a copy of its parent. An element
//! takes its class from its own `class` attribute, else from the nearest
//! enclosing body's `childclass`, else `main`. Attributes written on the
//! element always win over the class.

use std::collections::HashMap;

use crate::xml::XmlElement;

use super::MjcfError;

/// Name of the implicit top-level class
pub const MAIN_CLASS: &str = "main";

/// Elements inside `<worldbody>` that take defaults
const BODY_ELEMENTS: [&str; 5] = ["geom", "joint", "site", "camera", "light"];

/// Elements inside `<asset>` that take defaults
const ASSET_ELEMENTS: [&str; 2] = ["mesh", "material"];

type Attributes = Vec<(String, String)>;

/// Resolved default classes: class -> element -> attributes
#[derive(Debug, Clone, Default)]
pub struct DefaultClasses {
    classes: HashMap<String, HashMap<String, Attributes>>,
}

impl DefaultClasses {
    /// Collect the classes declared under a `<mujoco>` element
    pub fn from_mujoco(root: &XmlElement) -> Self {
        let mut classes = Self::default();
        classes.classes.insert(MAIN_CLASS.to_string(), HashMap::new());
        for default in root.children_named("default") {
            classes.collect(default, MAIN_CLASS, &HashMap::new());
        }
        classes
    }

    fn collect(&mut self, default: &XmlElement, class: &str, inherited: &HashMap<String, Attributes>) {
        let mut own = self.classes.remove(class).unwrap_or_else(|| inherited.clone());
        for child in &default.children {
            if child.name == "default" {
                continue;
            }
            let entry = own.entry(child.name.clone()).or_default();
            for (key, value) in &child.attributes {
                match entry.iter_mut().find(|(k, _)| k == key) {
                    Some(slot) => slot.1 = value.clone(),
                    None => entry.push((key.clone(), value.clone())),
                }
            }
        }

        for nested in default.children_named("default") {
            let Some(name) = nested.attr("class") else {
                tracing::warn!("Skipping nested <default> without a class in '{}'", class);
                continue;
            };
            self.collect(nested, name, &own);
        }

        tracing::debug!("Default class '{}' with {} element templates", class, own.len());
        self.classes.insert(class.to_string(), own);
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    /// Fill the missing attributes of `element` from `class`
    pub fn apply(&self, element: &mut XmlElement, class: &str) -> Result<(), MjcfError> {
        let templates = self
            .classes
            .get(class)
            .ok_or_else(|| MjcfError::UnknownClass(class.to_string()))?;
        if let Some(attributes) = templates.get(&element.name) {
            for (key, value) in attributes {
                if !element.has_attr(key) {
                    element.set_attr(key.as_str(), value.as_str());
                }
            }
        }
        Ok(())
    }

    /// Apply classes to every element of a `<worldbody>` tree
    pub fn apply_to_worldbody(&self, worldbody: &mut XmlElement) -> Result<(), MjcfError> {
        self.apply_in_body(worldbody, MAIN_CLASS)
    }

    fn apply_in_body(&self, body: &mut XmlElement, childclass: &str) -> Result<(), MjcfError> {
        for child in &mut body.children {
            if child.name == "body" {
                let nested_class = child.attr("childclass").unwrap_or(childclass).to_string();
                if !self.contains(&nested_class) {
                    return Err(MjcfError::UnknownClass(nested_class));
                }
                self.apply_in_body(child, &nested_class)?;
            } else if BODY_ELEMENTS.contains(&child.name.as_str()) {
                let class = child.attr("class").unwrap_or(childclass).to_string();
                self.apply(child, &class)?;
            }
        }
        Ok(())
    }

    /// Apply classes to mesh and material assets
    pub fn apply_to_assets(&self, asset: &mut XmlElement) -> Result<(), MjcfError> {
        for child in &mut asset.children {
            if ASSET_ELEMENTS.contains(&child.name.as_str()) {
                let class = child.attr("class").unwrap_or(MAIN_CLASS).to_string();
                self.apply(child, &class)?;
            }
        }
        Ok(())
    }
}
