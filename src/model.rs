//! Model records and the model field parser.
//!
//! ```text
//! ##
//! # @!model Widget
//! # A thing that can be sold.
//! # @property id (required) [integer] unique id
//! # @property label (nullable) [string] display label
//! #   shown on invoices
//! # @example
//! #   "Blue gear"
//! ```

use crate::block::{first_enclosed, Block, CommentLine};
use crate::error::ParseError;
use crate::grammar::{LineClassifier, Tag};

/// One field of a model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub datatype: String,
    pub description: String,
    /// `(required)` gives `Some(true)`, `(optional)` gives `Some(false)`
    pub required: Option<bool>,
    /// `(nullable)` gives `Some(true)`
    pub nullable: Option<bool>,
    pub example: Option<String>,
}

/// One documented data type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    pub name: String,
    pub description: String,
    pub summary: Option<String>,
    pub version: Option<String>,
    pub properties: Vec<Property>,
}

/// Parses one model block.
///
/// Never fails; a model line that also carries a parameter marker is reported through
/// `warnings` as [`ParseError::AmbiguousModelProperty`] and parsed as well as possible.
pub fn parse_model_block(
    block: &Block,
    classifier: &LineClassifier,
    warnings: &mut Vec<ParseError>,
) -> Model {
    let lines = &block.lines;
    let Some(model_index) = block.position(Tag::Model) else {
        return Model::default();
    };

    let mut model = Model {
        name: lines[model_index].rest.trim().to_string(),
        ..Model::default()
    };

    for line in &lines[model_index + 1..] {
        if classifier.mentions(&line.text, Tag::Parameter) {
            warnings.push(ParseError::AmbiguousModelProperty {
                line: line.number,
                model: model.name.clone(),
            });
        }
    }

    let mut description = Vec::new();
    let mut index = model_index + 1;
    while index < lines.len() {
        let line = &lines[index];
        match line.tag {
            Some(Tag::Property) => {
                let (property, next) = parse_property(lines, index);
                model.properties.push(property);
                index = next;
                continue;
            }
            Some(Tag::Summary) if !line.rest.is_empty() => model.summary = Some(line.rest.clone()),
            Some(Tag::Version) if !line.rest.is_empty() => model.version = Some(line.rest.clone()),
            None if model.properties.is_empty() && !line.text.is_empty() => {
                description.push(line.text.as_str())
            }
            _ => {}
        }
        index += 1;
    }
    model.description = description.join("\n");

    model
}

/// Parses the property at `index`; returns it with the index of the first unconsumed line.
fn parse_property(lines: &[CommentLine], index: usize) -> (Property, usize) {
    let line = &lines[index];
    let rest = line.rest.as_str();

    let name_end = rest.find(['(', '[']).unwrap_or(rest.len());
    let required = if rest.contains("(required)") {
        Some(true)
    } else if rest.contains("(optional)") {
        Some(false)
    } else {
        None
    };
    let nullable = rest.contains("(nullable)").then_some(true);

    let trailing = match rest.find(']') {
        Some(end) => &rest[end + 1..],
        None => rest.rfind(')').map_or(&rest[name_end..], |end| &rest[end + 1..]),
    };

    let mut property = Property {
        name: rest[..name_end].trim().to_string(),
        datatype: first_enclosed(rest, '[', ']').unwrap_or_default().to_string(),
        description: trailing.trim().to_string(),
        required,
        nullable,
        example: None,
    };

    // One continuation line at most.
    let mut next = index + 1;
    if let Some(continuation) = lines.get(next) {
        if continuation.is_plain() && !continuation.text.is_empty() {
            if property.description.is_empty() {
                property.description = continuation.text.clone();
            } else {
                property.description = format!("{}\n\n{}", property.description, continuation.text);
            }
            next += 1;
        }
    }

    if let Some(marker) = lines.get(next).filter(|l| l.is(Tag::Example)) {
        let inline = marker.rest.trim();
        let raw = if inline.is_empty() {
            next += 1;
            lines.get(next).filter(|l| l.is_plain()).map(|l| l.text.as_str())
        } else {
            Some(inline)
        };
        if let Some(raw) = raw {
            let example = raw.trim().trim_matches('"').trim();
            property.example = Some(example.to_string());
            next += 1;
        }
    }

    (property, next)
}
