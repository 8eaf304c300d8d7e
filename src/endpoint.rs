//! Endpoint records and the endpoint field parser.
//!
//! An endpoint block looks like this:
//!
//! ```text
//! ##
//! # Get a widget
//! # @path [GET] /widgets/{id}
//! # @parameter id (path) [integer] widget id
//! # @response_type [Widget]
//! # @response 200 OK
//! # @response 404 Not found
//! # @example_response
//! #   {"id": 1}
//! ```
//!
//! Lines before `@path` form the description. The resource name and description come from the
//! `@resource` block that precedes the endpoint block in the same file.

use crate::block::{enclosed_groups, first_enclosed, Block, CommentLine};
use crate::error::{ParseError, Result};
use crate::grammar::Tag;
use std::fmt;

/// HTTP verbs accepted in `@path [VERB]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Parses a verb token, ignoring ASCII case
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
        ]
        .into_iter()
        .find(|m| m.as_str().eq_ignore_ascii_case(token))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Lower-case key used under an OpenAPI path item
    pub fn key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
    FormData,
    Header,
}

impl ParameterLocation {
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        [
            ParameterLocation::Path,
            ParameterLocation::Query,
            ParameterLocation::Body,
            ParameterLocation::FormData,
            ParameterLocation::Header,
        ]
        .into_iter()
        .find(|l| l.as_str().eq_ignore_ascii_case(token))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Body => "body",
            ParameterLocation::FormData => "formData",
            ParameterLocation::Header => "header",
        }
    }
}

/// One request input of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    /// Primitive token or model name, as written
    pub datatype: String,
    pub description: String,
    pub required: bool,
}

/// One documented response of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code as written ("200", "204", "default")
    pub code: String,
    pub description: String,
}

impl Response {
    /// 204 responses are rendered without a body
    pub fn has_no_content(&self) -> bool {
        self.code == "204"
    }
}

/// Resource context from an `@resource` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub description: String,
}

/// One documented HTTP operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub resource: String,
    pub resource_description: String,
    pub path: String,
    pub method: HttpMethod,
    pub description: String,
    pub summary: Option<String>,
    pub operation_id: Option<String>,
    pub parameters: Vec<Parameter>,
    pub responses: Vec<Response>,
    /// Data type of a successful response (`@response_type`)
    pub response_data_type: Option<String>,
    /// Raw example request body
    pub example_request: Option<String>,
    /// Raw example response body
    pub example_response: Option<String>,
}

/// Reads the resource name and description out of a resource block.
pub fn parse_resource_block(block: &Block) -> Resource {
    let Some(index) = block.position(Tag::Resource) else {
        return Resource::default();
    };

    let description = block.lines[index + 1..]
        .iter()
        .filter(|l| l.is_plain() && !l.text.is_empty())
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    Resource {
        name: block.lines[index].rest.clone(),
        description,
    }
}

/// Parses one endpoint block into an [`Endpoint`].
///
/// # Errors
///
/// - [`ParseError::MalformedPath`] when the verb is unknown or the path is empty
/// - [`ParseError::MalformedParameter`] when a parameter location is missing or unknown
/// - [`ParseError::MalformedResponse`] when a response has no code
pub fn parse_endpoint_block(block: &Block, resource: &Resource) -> Result<Endpoint> {
    let lines = &block.lines;
    let path_index = block
        .position(Tag::Path)
        .ok_or_else(|| ParseError::MalformedPath {
            line: block.start_line(),
            message: "block has no @path line".to_string(),
        })?;
    let (method, path) = parse_path_line(&lines[path_index])?;

    let description = lines[..path_index]
        .iter()
        .filter(|l| l.is_plain() && !l.text.is_empty())
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut parameters = Vec::new();
    let mut responses = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        match line.tag {
            Some(Tag::Parameter) => parameters.push(parse_parameter(lines, index)?),
            Some(Tag::Response) => responses.push(parse_response(line)?),
            _ => {}
        }
    }

    let response_data_type = tagged_rest(lines, Tag::ResponseType).and_then(|rest| {
        let datatype = first_enclosed(rest, '[', ']').unwrap_or(rest).trim();
        (!datatype.is_empty()).then(|| datatype.to_string())
    });

    Ok(Endpoint {
        resource: resource.name.clone(),
        resource_description: resource.description.clone(),
        path,
        method,
        description,
        summary: tagged_text(lines, Tag::Summary),
        operation_id: tagged_text(lines, Tag::OperationId),
        parameters,
        responses,
        response_data_type,
        example_request: example_text(lines, Tag::ExampleRequest),
        example_response: example_text(lines, Tag::Example),
    })
}

/// `[GET] /widgets/{id}`; the brackets around the verb may be left out.
fn parse_path_line(line: &CommentLine) -> Result<(HttpMethod, String)> {
    let rest = line.rest.trim();
    let (verb, path) = if rest.starts_with('[') {
        match rest.find(']') {
            Some(end) => (rest[1..end].trim(), rest[end + 1..].trim()),
            None => {
                return Err(ParseError::MalformedPath {
                    line: line.number,
                    message: format!("unterminated verb in '{}'", rest),
                })
            }
        }
    } else {
        match rest.split_once(char::is_whitespace) {
            Some((verb, path)) => (verb, path.trim()),
            None => (rest, ""),
        }
    };

    let method = HttpMethod::parse(verb).ok_or_else(|| ParseError::MalformedPath {
        line: line.number,
        message: format!("unknown HTTP verb '{}'", verb),
    })?;

    if path.is_empty() {
        return Err(ParseError::MalformedPath {
            line: line.number,
            message: "empty path".to_string(),
        });
    }

    Ok((method, path.to_string()))
}

/// `id (path) [integer] widget id`, continued by the untagged lines that follow.
fn parse_parameter(lines: &[CommentLine], index: usize) -> Result<Parameter> {
    let line = &lines[index];
    let rest = line.rest.as_str();

    let name_end = rest.find(['(', '[']).unwrap_or(rest.len());
    let name = rest[..name_end].trim().to_string();

    let groups = enclosed_groups(rest, '(', ')');
    let location_token = groups
        .iter()
        .find(|g| !g.eq_ignore_ascii_case("required"))
        .ok_or_else(|| ParseError::MalformedParameter {
            line: line.number,
            message: format!("parameter '{}' has no (location)", name),
        })?;
    let location =
        ParameterLocation::parse(location_token).ok_or_else(|| ParseError::MalformedParameter {
            line: line.number,
            message: format!(
                "parameter '{}' has unknown location '{}'",
                name, location_token
            ),
        })?;

    let datatype = first_enclosed(rest, '[', ']').unwrap_or_default().to_string();

    let trailing = match rest.find(']') {
        Some(end) => &rest[end + 1..],
        None => rest.rfind(')').map_or("", |end| &rest[end + 1..]),
    };
    let mut description_parts = vec![trailing.trim()];
    description_parts.extend(
        lines[index + 1..]
            .iter()
            .take_while(|l| l.is_plain())
            .map(|l| l.text.as_str()),
    );
    let description = description_parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let required = location == ParameterLocation::Path
        || groups.iter().any(|g| g.eq_ignore_ascii_case("required"));

    Ok(Parameter {
        name,
        location,
        datatype,
        description,
        required,
    })
}

/// `200 OK`
fn parse_response(line: &CommentLine) -> Result<Response> {
    let rest = line.rest.trim();
    let (code, description) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if code.is_empty() {
        return Err(ParseError::MalformedResponse {
            line: line.number,
            message: "response has no status code".to_string(),
        });
    }

    Ok(Response {
        code: code.to_string(),
        description: description.trim().to_string(),
    })
}

fn tagged_rest(lines: &[CommentLine], tag: Tag) -> Option<&str> {
    lines.iter().find(|l| l.is(tag)).map(|l| l.rest.as_str())
}

fn tagged_text(lines: &[CommentLine], tag: Tag) -> Option<String> {
    tagged_rest(lines, tag)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Example body: text on the marker line itself, otherwise the line right after it.
fn example_text(lines: &[CommentLine], tag: Tag) -> Option<String> {
    let index = lines.iter().position(|l| l.is(tag))?;
    let inline = lines[index].rest.trim();
    let text = if inline.is_empty() {
        lines.get(index + 1)?.text.trim()
    } else {
        inline
    };
    (!text.is_empty()).then(|| text.to_string())
}
