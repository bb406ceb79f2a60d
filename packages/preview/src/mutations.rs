//! # Live Document Mutations
//!
//! Semantic operations on the rendered preview tree.
//!
//! ## Design
//!
//! 1. **Intent-preserving**: each mutation is one user-level edit
//! 2. **Validated**: structural constraints are checked before any change
//! 3. **Keyed by identifier**: nodes are addressed by their stable marker,
//!    never by tree position

use crate::styles::{parse_inline_style, write_inline_style};
use serde::{Deserialize, Serialize};
use sitecanvas_dom::{Document, Element, Node, VISUAL_ID_ATTR};
use thiserror::Error;

/// Semantic mutations applied to the live preview document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Set one property in the element's inline style attribute
    SetInlineStyle {
        id: String,
        property: String,
        value: String,
    },

    /// Set an attribute value
    SetAttribute {
        id: String,
        name: String,
        value: String,
    },

    /// Replace text content (atomic replacement, not a character diff)
    SetText {
        id: String,
        text: String,
    },

    /// Move an element under a new parent at the given child index
    MoveElement {
        id: String,
        new_parent_id: String,
        index: usize,
    },

    /// Remove an element and all its descendants
    RemoveElement {
        id: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Element not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Element has element children; text cannot be set")]
    HasElementChildren,

    #[error("Node is not text-editable")]
    NotText,

    #[error("Invalid child index: {0}")]
    InvalidIndex(usize),
}

impl Mutation {
    /// Apply the mutation with validation
    pub fn apply(&self, doc: &mut Document) -> Result<(), MutationError> {
        self.validate(doc)?;

        match self {
            Mutation::SetInlineStyle {
                id,
                property,
                value,
            } => apply_set_inline_style(doc, id, property, value),
            Mutation::SetAttribute { id, name, value } => {
                apply_set_attribute(doc, id, name, value)
            }
            Mutation::SetText { id, text } => apply_set_text(doc, id, text),
            Mutation::MoveElement {
                id,
                new_parent_id,
                index,
            } => apply_move(doc, id, new_parent_id, *index),
            Mutation::RemoveElement { id } => {
                remove_element(doc, id)?;
                Ok(())
            }
        }
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::SetInlineStyle { id, .. } | Mutation::SetAttribute { id, .. } => {
                find_element(doc, id)
                    .map(|_| ())
                    .ok_or_else(|| MutationError::NodeNotFound(id.clone()))
            }

            Mutation::SetText { id, .. } => {
                let element =
                    find_element(doc, id).ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                if element.has_element_children() {
                    return Err(MutationError::HasElementChildren);
                }
                Ok(())
            }

            Mutation::MoveElement {
                id,
                new_parent_id,
                index,
            } => {
                let node =
                    find_element(doc, id).ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                if id == new_parent_id {
                    return Err(MutationError::CycleDetected);
                }
                // Moving an element under its own descendant detaches it
                // from the tree
                if find_in_element(node, new_parent_id).is_some() {
                    return Err(MutationError::CycleDetected);
                }
                let parent = find_element(doc, new_parent_id)
                    .ok_or_else(|| MutationError::ParentNotFound(new_parent_id.clone()))?;
                if *index > parent.children.len() {
                    return Err(MutationError::InvalidIndex(*index));
                }
                Ok(())
            }

            Mutation::RemoveElement { id } => find_element(doc, id)
                .map(|_| ())
                .ok_or_else(|| MutationError::NodeNotFound(id.clone())),
        }
    }
}

/// First element carrying the identifier marker
pub fn find_element<'doc>(doc: &'doc Document, id: &str) -> Option<&'doc Element> {
    doc.find_element(|el| el.attr(VISUAL_ID_ATTR) == Some(id))
}

pub fn find_element_mut<'doc>(doc: &'doc mut Document, id: &str) -> Option<&'doc mut Element> {
    doc.find_element_mut(|el| el.attr(VISUAL_ID_ATTR) == Some(id))
}

fn find_in_element<'el>(root: &'el Element, id: &str) -> Option<&'el Element> {
    for child in root.element_children() {
        if child.attr(VISUAL_ID_ATTR) == Some(id) {
            return Some(child);
        }
        if let Some(found) = find_in_element(child, id) {
            return Some(found);
        }
    }
    None
}

fn apply_set_inline_style(
    doc: &mut Document,
    id: &str,
    property: &str,
    value: &str,
) -> Result<(), MutationError> {
    let element =
        find_element_mut(doc, id).ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

    let mut properties = element
        .attr("style")
        .map(parse_inline_style)
        .unwrap_or_default();
    if let Some(entry) = properties.iter_mut().find(|(p, _)| p == property) {
        entry.1 = value.to_string();
    } else {
        properties.push((property.to_string(), value.to_string()));
    }
    element.set_attr("style", &write_inline_style(&properties));
    Ok(())
}

fn apply_set_attribute(
    doc: &mut Document,
    id: &str,
    name: &str,
    value: &str,
) -> Result<(), MutationError> {
    let element =
        find_element_mut(doc, id).ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
    element.set_attr(name, value);
    Ok(())
}

fn apply_set_text(doc: &mut Document, id: &str, text: &str) -> Result<(), MutationError> {
    let element =
        find_element_mut(doc, id).ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
    element.children = vec![Node::Text(text.to_string())];
    Ok(())
}

fn apply_move(
    doc: &mut Document,
    id: &str,
    new_parent_id: &str,
    index: usize,
) -> Result<(), MutationError> {
    let node = remove_element(doc, id)?;
    let parent = find_element_mut(doc, new_parent_id)
        .ok_or_else(|| MutationError::ParentNotFound(new_parent_id.to_string()))?;
    let insert_index = index.min(parent.children.len());
    parent.children.insert(insert_index, node);
    Ok(())
}

/// Detach an element from its parent and return it
fn remove_element(doc: &mut Document, id: &str) -> Result<Node, MutationError> {
    remove_from_nodes(&mut doc.children, id)
        .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))
}

fn remove_from_nodes(nodes: &mut Vec<Node>, id: &str) -> Option<Node> {
    if let Some(position) = nodes.iter().position(
        |node| matches!(node, Node::Element(el) if el.attr(VISUAL_ID_ATTR) == Some(id)),
    ) {
        return Some(nodes.remove(position));
    }
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            if let Some(removed) = remove_from_nodes(&mut el.children, id) {
                return Some(removed);
            }
        }
    }
    None
}
