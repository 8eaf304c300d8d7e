//! Annotation grammar and line classification.
//!
//! The marker literals (`@path`, `@parameter`, ...) live in a [`Grammar`] value rather than in
//! global constants, so a project can ship its own spelling of the tags in a YAML or JSON file.
//! A [`LineClassifier`] is compiled from the grammar once and then decides, for each source line,
//! whether it is a comment and which tag (if any) it starts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tags recognised at the start of a comment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `##`, opens an annotation block
    BlockStart,
    Resource,
    Path,
    Parameter,
    Response,
    ResponseType,
    /// Response example (`@example`, `@example_response`)
    Example,
    ExampleRequest,
    /// `@!model` or `@model`
    Model,
    Property,
    Summary,
    OperationId,
    Version,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::BlockStart => "block start",
            Tag::Resource => "resource",
            Tag::Path => "path",
            Tag::Parameter => "parameter",
            Tag::Response => "response",
            Tag::ResponseType => "response_type",
            Tag::Example => "example",
            Tag::ExampleRequest => "example_request",
            Tag::Model => "model",
            Tag::Property => "property",
            Tag::Summary => "summary",
            Tag::OperationId => "operation_id",
            Tag::Version => "version",
        };
        write!(f, "{}", name)
    }
}

/// Marker literals of the annotation grammar.
///
/// Every tag may have several spellings. Missing fields fall back to the defaults when a grammar
/// is loaded from a file, so a file only has to list the markers it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grammar {
    /// Prefix that makes a line a comment line
    pub comment_prefix: String,
    /// Prefix that opens an annotation block
    pub block_marker: String,
    pub resource: Vec<String>,
    pub path: Vec<String>,
    pub parameter: Vec<String>,
    pub response: Vec<String>,
    pub response_type: Vec<String>,
    pub example: Vec<String>,
    pub example_request: Vec<String>,
    pub model: Vec<String>,
    pub property: Vec<String>,
    pub summary: Vec<String>,
    pub operation_id: Vec<String>,
    pub version: Vec<String>,
}

fn spellings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            comment_prefix: "#".to_string(),
            block_marker: "##".to_string(),
            resource: spellings(&["@resource"]),
            path: spellings(&["@path"]),
            parameter: spellings(&["@parameter"]),
            response: spellings(&["@response"]),
            response_type: spellings(&["@response_type"]),
            example: spellings(&["@example", "@example_response"]),
            example_request: spellings(&["@example_request"]),
            model: spellings(&["@!model", "@model"]),
            property: spellings(&["@property"]),
            summary: spellings(&["@summary"]),
            operation_id: spellings(&["@operation_id"]),
            version: spellings(&["@version"]),
        }
    }
}

impl Grammar {
    /// Spellings of one tag
    pub fn markers(&self, tag: Tag) -> Vec<String> {
        match tag {
            Tag::BlockStart => vec![self.block_marker.clone()],
            Tag::Resource => self.resource.clone(),
            Tag::Path => self.path.clone(),
            Tag::Parameter => self.parameter.clone(),
            Tag::Response => self.response.clone(),
            Tag::ResponseType => self.response_type.clone(),
            Tag::Example => self.example.clone(),
            Tag::ExampleRequest => self.example_request.clone(),
            Tag::Model => self.model.clone(),
            Tag::Property => self.property.clone(),
            Tag::Summary => self.summary.clone(),
            Tag::OperationId => self.operation_id.clone(),
            Tag::Version => self.version.clone(),
        }
    }
}

/// Result of classifying one source line.
///
/// `body` is the comment text with the comment prefix and surrounding whitespace removed,
/// `rest` is what follows the tag marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    NotComment,
    Plain(&'a str),
    Tagged { tag: Tag, body: &'a str, rest: &'a str },
}

/// Ordered-match tokenizer for comment lines, compiled from a [`Grammar`].
#[derive(Debug, Clone)]
pub struct LineClassifier {
    grammar: Grammar,
    /// All tag spellings, longest first
    markers: Vec<(String, Tag)>,
}

const BODY_TAGS: [Tag; 12] = [
    Tag::Resource,
    Tag::Path,
    Tag::Parameter,
    Tag::Response,
    Tag::ResponseType,
    Tag::Example,
    Tag::ExampleRequest,
    Tag::Model,
    Tag::Property,
    Tag::Summary,
    Tag::OperationId,
    Tag::Version,
];

impl LineClassifier {
    pub fn new(grammar: Grammar) -> Self {
        let mut markers: Vec<(String, Tag)> = BODY_TAGS
            .iter()
            .flat_map(|tag| {
                grammar
                    .markers(*tag)
                    .into_iter()
                    .filter(|m| !m.is_empty())
                    .map(move |m| (m, *tag))
            })
            .collect();
        // Stable sort keeps declaration order between spellings of equal length.
        markers.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self { grammar, markers }
    }

    /// Classifies a single line of source text.
    pub fn classify<'a>(&self, line: &'a str) -> Classification<'a> {
        let trimmed = line.trim();

        let block_marker = self.grammar.block_marker.as_str();
        if !block_marker.is_empty() && trimmed.starts_with(block_marker) {
            let rest = trimmed[block_marker.len()..].trim();
            return Classification::Tagged {
                tag: Tag::BlockStart,
                body: rest,
                rest,
            };
        }

        let prefix = self.grammar.comment_prefix.as_str();
        if prefix.is_empty() || !trimmed.starts_with(prefix) {
            return Classification::NotComment;
        }

        let body = trimmed[prefix.len()..].trim();
        match self.match_marker(body) {
            Some((tag, marker_len)) => Classification::Tagged {
                tag,
                body,
                rest: body[marker_len..].trim(),
            },
            None => Classification::Plain(body),
        }
    }

    /// Finds the most specific marker at the start of `body`.
    fn match_marker(&self, body: &str) -> Option<(Tag, usize)> {
        self.markers.iter().find_map(|(marker, tag)| {
            if !body.starts_with(marker.as_str()) {
                return None;
            }
            // `@responses` is not `@response`; the marker has to end at a word boundary.
            let boundary = body[marker.len()..]
                .chars()
                .next()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
            boundary.then_some((*tag, marker.len()))
        })
    }

    /// Whether `text` contains any spelling of `tag` anywhere.
    pub fn mentions(&self, text: &str, tag: Tag) -> bool {
        self.grammar
            .markers(tag)
            .iter()
            .any(|m| !m.is_empty() && text.contains(m.as_str()))
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(Grammar::default())
    }
}
