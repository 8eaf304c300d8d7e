//! Groups parsed endpoints by URL path.

use crate::endpoint::{Endpoint, HttpMethod, Parameter, Response};
use crate::error::ParseError;
use indexmap::IndexMap;
use log::debug;
use std::collections::HashSet;

/// Everything an [`Endpoint`] holds except the path and resource, which are hoisted onto the
/// [`CompoundEndpoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbDescriptor {
    pub method: HttpMethod,
    /// Tag names for the operation (the endpoint's resource)
    pub tags: Vec<String>,
    /// Description of the resource the tag names
    pub resource_description: String,
    pub description: String,
    pub summary: Option<String>,
    pub operation_id: Option<String>,
    pub parameters: Vec<Parameter>,
    pub responses: Vec<Response>,
    pub response_data_type: Option<String>,
    pub example_request: Option<String>,
    pub example_response: Option<String>,
}

impl From<Endpoint> for VerbDescriptor {
    fn from(endpoint: Endpoint) -> Self {
        let tags = if endpoint.resource.is_empty() {
            Vec::new()
        } else {
            vec![endpoint.resource]
        };
        Self {
            method: endpoint.method,
            tags,
            resource_description: endpoint.resource_description,
            description: endpoint.description,
            summary: endpoint.summary,
            operation_id: endpoint.operation_id,
            parameters: endpoint.parameters,
            responses: endpoint.responses,
            response_data_type: endpoint.response_data_type,
            example_request: endpoint.example_request,
            example_response: endpoint.example_response,
        }
    }
}

/// One URL path with all of its documented verbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundEndpoint {
    pub path: String,
    pub resource: String,
    pub resource_description: String,
    /// Descriptors in first-seen order; duplicates of a verb are kept
    pub operations: Vec<VerbDescriptor>,
}

/// Rewrites `:param` segments to OpenAPI `{param}` form.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|part| match part.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Groups endpoints by path, in order of first appearance.
///
/// Paths are compared after [`normalize_path`], so `/w/:id` and `/w/{id}` share a group.
/// Resource metadata on each group is the first non-empty value seen for that path.
pub fn group_by_path(endpoints: Vec<Endpoint>) -> Vec<CompoundEndpoint> {
    let mut groups: IndexMap<String, CompoundEndpoint> = IndexMap::new();

    for endpoint in endpoints {
        let path = normalize_path(&endpoint.path);
        let compound = groups
            .entry(path.clone())
            .or_insert_with(|| CompoundEndpoint {
                path,
                resource: String::new(),
                resource_description: String::new(),
                operations: Vec::new(),
            });

        if compound.resource.is_empty() {
            compound.resource = endpoint.resource.clone();
        }
        if compound.resource_description.is_empty() {
            compound.resource_description = endpoint.resource_description.clone();
        }
        compound.operations.push(endpoint.into());
    }

    debug!("Grouped endpoints into {} paths", groups.len());
    groups.into_values().collect()
}

/// Reports every path/verb pair documented more than once.
///
/// The document builder keeps the last of such descriptors, so each pair is reported once as a
/// [`ParseError::DuplicateOperation`] warning.
pub fn find_duplicate_operations(compounds: &[CompoundEndpoint]) -> Vec<ParseError> {
    let mut duplicates = Vec::new();

    for compound in compounds {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for operation in &compound.operations {
            if !seen.insert(operation.method) && reported.insert(operation.method) {
                debug!(
                    "{} {} is documented more than once",
                    operation.method, compound.path
                );
                duplicates.push(ParseError::DuplicateOperation {
                    path: compound.path.clone(),
                    method: operation.method.to_string(),
                });
            }
        }
    }

    duplicates
}
