use crate::aggregator::{CompoundEndpoint, VerbDescriptor};
use crate::endpoint::{HttpMethod, ParameterLocation};
use crate::model::Model;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data types rendered inline as `{"type": ...}`; anything else is a model reference.
pub const PRIMITIVE_TYPES: [&str; 8] = [
    "array", "integer", "string", "double", "long", "short", "char", "number",
];

const JSON_MEDIA_TYPE: &str = "application/json";

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Servers section
    servers: Vec<Server>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// API version
    pub version: String,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

/// OpenAPI PathItem object - all operations of one path, keyed by lower-case verb
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(flatten)]
    pub operations: IndexMap<String, Operation>,
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub tags: Vec<String>,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code
    pub responses: IndexMap<String, Response>,
    pub description: String,
    pub summary: String,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    /// Parameter location (path, query, body, formData, header)
    #[serde(rename = "in")]
    pub location: String,
    pub schema: Schema,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    /// Absent for 204 responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// OpenAPI Tag object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTag {
    pub name: String,
    pub description: String,
}

/// OpenAPI Schema object, reduced to the keywords this generator emits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to a component schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Schema {
    pub fn of_type(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: Some(schema_type.into()),
            ..Self::default()
        }
    }

    pub fn reference(model: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{}", model)),
            ..Self::default()
        }
    }

    /// Schema for a documented data type token.
    ///
    /// Primitive tokens become `{"type": <lower-case token>}`, any other token a `$ref` to the
    /// component schema of that name. An empty token gives a plain object.
    pub fn for_datatype(datatype: &str) -> Self {
        let datatype = datatype.trim();
        if datatype.is_empty() {
            return Self::of_type("object");
        }
        let lower = datatype.to_lowercase();
        if PRIMITIVE_TYPES.contains(&lower.as_str()) {
            Self::of_type(lower)
        } else {
            Self::reference(datatype)
        }
    }
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub schemas: IndexMap<String, Schema>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    pub info: Info,
    pub servers: Vec<Server>,
    pub paths: IndexMap<String, PathItem>,
    pub tags: Vec<ApiTag>,
    pub components: Components,
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "Generated API".to_string(),
                description: Some("API documentation generated from source annotations".to_string()),
                version: "1.0.0".to_string(),
            },
            servers: vec![Server {
                url: "/".to_string(),
            }],
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            description,
            version,
        };
        self
    }

    /// Set the server URLs; an empty list keeps the default
    pub fn with_servers(mut self, urls: Vec<String>) -> Self {
        if !urls.is_empty() {
            self.servers = urls.into_iter().map(|url| Server { url }).collect();
        }
        self
    }

    /// Build the final OpenAPI document.
    ///
    /// Paths, verbs, parameters, responses and properties keep the order of the input. When a
    /// path documents the same verb twice, the later descriptor replaces the earlier one.
    pub fn build(self, compounds: Vec<CompoundEndpoint>, models: Vec<Model>) -> OpenApiDocument {
        debug!(
            "Building OpenAPI document from {} paths and {} models",
            compounds.len(),
            models.len()
        );

        let tags = Self::collect_tags(&compounds);

        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        for compound in compounds {
            let path_item = paths.entry(compound.path.clone()).or_default();
            for descriptor in compound.operations {
                debug!("Adding operation: {} {}", descriptor.method, compound.path);
                let key = descriptor.method.key().to_string();
                let operation = Self::build_operation(&compound.path, descriptor);
                path_item.operations.insert(key, operation);
            }
        }

        let mut schemas = IndexMap::new();
        for model in models {
            if schemas.contains_key(&model.name) {
                warn!("Model {} is documented more than once, the last block wins", model.name);
            }
            let name = model.name.clone();
            schemas.insert(name, Self::build_model_schema(model));
        }

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.info,
            servers: self.servers,
            paths,
            tags,
            components: Components { schemas },
        }
    }

    fn build_operation(path: &str, descriptor: VerbDescriptor) -> Operation {
        let operation_id = descriptor
            .operation_id
            .unwrap_or_else(|| Self::default_operation_id(descriptor.method, path));

        let request_body = descriptor.example_request.as_deref().map(|raw| {
            let schema = descriptor
                .parameters
                .iter()
                .find(|p| p.location == ParameterLocation::Body)
                .map_or_else(|| Schema::of_type("object"), |p| Schema::for_datatype(&p.datatype));
            let mut content = IndexMap::new();
            content.insert(
                JSON_MEDIA_TYPE.to_string(),
                MediaType {
                    schema,
                    example: Some(Self::example_value(raw)),
                },
            );
            RequestBody { content }
        });

        let parameters = descriptor
            .parameters
            .into_iter()
            .map(|p| Parameter {
                name: p.name,
                description: p.description,
                required: p.required,
                location: p.location.as_str().to_string(),
                schema: if p.datatype.is_empty() {
                    Schema::default()
                } else {
                    Schema::of_type(p.datatype)
                },
            })
            .collect();

        let response_schema =
            Schema::for_datatype(descriptor.response_data_type.as_deref().unwrap_or_default());
        let mut responses = IndexMap::new();
        for response in descriptor.responses {
            let content = if response.has_no_content() {
                None
            } else {
                let example = descriptor
                    .example_response
                    .as_deref()
                    .filter(|_| response.code.starts_with('2'))
                    .map(Self::example_value);
                let mut content = IndexMap::new();
                content.insert(
                    JSON_MEDIA_TYPE.to_string(),
                    MediaType {
                        schema: response_schema.clone(),
                        example,
                    },
                );
                Some(content)
            };
            responses.insert(
                response.code,
                Response {
                    description: response.description,
                    content,
                },
            );
        }

        Operation {
            tags: descriptor.tags,
            operation_id,
            parameters,
            request_body,
            responses,
            description: descriptor.description,
            summary: descriptor.summary.unwrap_or_default(),
        }
    }

    fn build_model_schema(model: Model) -> Schema {
        let required: Vec<String> = model
            .properties
            .iter()
            .filter(|p| p.required == Some(true))
            .map(|p| p.name.clone())
            .collect();

        let properties: IndexMap<String, Schema> = model
            .properties
            .into_iter()
            .map(|p| {
                let schema = Schema {
                    schema_type: (!p.datatype.is_empty()).then_some(p.datatype),
                    description: (!p.description.is_empty()).then_some(p.description),
                    nullable: p.nullable,
                    example: p.example.map(Value::String),
                    ..Schema::default()
                };
                (p.name, schema)
            })
            .collect();

        Schema {
            schema_type: Some("object".to_string()),
            description: (!model.description.is_empty()).then_some(model.description),
            properties: Some(properties),
            required: (!required.is_empty()).then_some(required),
            ..Schema::default()
        }
    }

    /// Distinct operation tags in first-seen order, each described by the first non-empty
    /// description of the resource it names.
    fn collect_tags(compounds: &[CompoundEndpoint]) -> Vec<ApiTag> {
        let mut tags: IndexMap<&str, &str> = IndexMap::new();
        for operation in compounds.iter().flat_map(|c| c.operations.iter()) {
            for name in &operation.tags {
                let description = tags.entry(name.as_str()).or_default();
                if description.is_empty() {
                    *description = operation.resource_description.as_str();
                }
            }
        }
        tags.into_iter()
            .map(|(name, description)| ApiTag {
                name: name.to_string(),
                description: description.to_string(),
            })
            .collect()
    }

    /// `GET /widgets/{id}` gives `get_widgets_id`
    fn default_operation_id(method: HttpMethod, path: &str) -> String {
        let mut parts = vec![method.key().to_string()];
        parts.extend(
            path.split('/')
                .map(|segment| {
                    segment
                        .chars()
                        .filter(|c| c.is_alphanumeric() || *c == '_')
                        .collect::<String>()
                })
                .filter(|segment| !segment.is_empty()),
        );
        parts.join("_")
    }

    /// Example text as JSON when it parses, as a JSON string otherwise
    fn example_value(raw: &str) -> Value {
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}
