use openapi_from_annotations::{
    aggregator::{find_duplicate_operations, group_by_path},
    cli::{run, CliArgs},
    error::ParseError,
    grammar::Grammar,
    openapi_builder::{OpenApiBuilder, OpenApiDocument},
    parser::{AnnotationParser, ParsedDocs},
    scanner::FileScanner,
    serializer::{serialize_json, serialize_yaml},
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Helper function to create a temporary project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn parse_dirs(dirs: &[PathBuf]) -> ParsedDocs {
    let mut files = Vec::new();
    for dir in dirs {
        let scan_result = FileScanner::new(dir.clone())
            .scan()
            .expect("Failed to scan directory");
        files.extend(scan_result.files);
    }
    AnnotationParser::new(Grammar::default()).parse_files(&files)
}

fn generate(docs: ParsedDocs) -> OpenApiDocument {
    OpenApiBuilder::new().build(group_by_path(docs.endpoints), docs.models)
}

fn to_json(document: &OpenApiDocument) -> Value {
    serde_json::from_str(&serialize_json(document).expect("Failed to serialize")).unwrap()
}

#[test]
fn test_fixture_project_end_to_end() {
    let docs = parse_dirs(&[fixtures().join("models"), fixtures().join("controllers")]);

    // The orphan controller documents an endpoint without a resource block
    assert_eq!(docs.diagnostics.len(), 1);
    assert!(matches!(
        docs.diagnostics[0].error,
        ParseError::MissingResourceContext { line: 2 }
    ));
    assert!(docs.diagnostics[0].file.ends_with("orphan_controller.rb"));

    assert_eq!(docs.endpoints.len(), 4);
    assert_eq!(docs.models.len(), 1);

    let json = to_json(&generate(docs));

    let paths: Vec<&String> = json["paths"].as_object().unwrap().keys().collect();
    assert_eq!(paths, vec!["/widgets", "/widgets/{id}"]);
    assert!(json["paths"].get("/orphans").is_none());

    let by_id = &json["paths"]["/widgets/{id}"];
    let verbs: Vec<&String> = by_id.as_object().unwrap().keys().collect();
    assert_eq!(verbs, vec!["get", "delete"]);

    assert_eq!(
        by_id["get"],
        json!({
            "tags": ["Widgets"],
            "operationId": "get_widgets_id",
            "parameters": [{
                "name": "id",
                "description": "widget id",
                "required": true,
                "in": "path",
                "schema": {"type": "integer"}
            }],
            "responses": {
                "200": {
                    "description": "Found",
                    "content": {
                        "application/json": {
                            "schema": {"$ref": "#/components/schemas/Widget"},
                            "example": {"id": 1, "label": "Blue gear"}
                        }
                    }
                },
                "404": {
                    "description": "Missing",
                    "content": {
                        "application/json": {
                            "schema": {"$ref": "#/components/schemas/Widget"}
                        }
                    }
                }
            },
            "description": "Fetch one widget",
            "summary": ""
        })
    );

    assert_eq!(
        by_id["delete"]["responses"]["204"],
        json!({"description": "Removed"})
    );

    let list = &json["paths"]["/widgets"]["get"];
    assert_eq!(list["parameters"][0]["in"], "query");
    assert_eq!(list["parameters"][0]["required"], false);
    assert_eq!(
        list["responses"]["200"]["content"]["application/json"]["schema"],
        json!({"type": "array"})
    );

    let create = &json["paths"]["/widgets"]["post"];
    assert_eq!(create["parameters"][0]["required"], true);
    assert_eq!(
        create["requestBody"]["content"]["application/json"],
        json!({
            "schema": {"$ref": "#/components/schemas/Widget"},
            "example": {"label": "Red gear"}
        })
    );

    assert_eq!(
        json["tags"],
        json!([{"name": "Widgets", "description": "Everything about widgets"}])
    );

    assert_eq!(
        json["components"]["schemas"]["Widget"],
        json!({
            "type": "object",
            "description": "A thing that can be sold.",
            "properties": {
                "id": {"type": "integer", "description": "unique id"},
                "label": {
                    "type": "string",
                    "description": "display label\n\nshown on invoices",
                    "nullable": true,
                    "example": "Blue gear"
                },
                "price": {"type": "number", "description": "unit price"}
            },
            "required": ["id"]
        })
    );
}

#[test]
fn test_generation_is_stable() {
    let dirs = [fixtures().join("models"), fixtures().join("controllers")];

    let first = serialize_json(&generate(parse_dirs(&dirs))).unwrap();
    let second = serialize_json(&generate(parse_dirs(&dirs))).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_yaml_output() {
    let docs = parse_dirs(&[fixtures().join("controllers")]);
    let yaml = serialize_yaml(&generate(docs)).expect("Failed to serialize to YAML");

    assert!(yaml.contains("operationId: get_widgets"));

    let parsed: Value = serde_yaml::from_str(&yaml).unwrap();
    assert!(parsed["paths"].get("/widgets/{id}").is_some());
    assert_eq!(parsed["paths"]["/widgets"]["post"]["tags"][0], "Widgets");
}

#[test]
fn test_endpoints_across_files_share_a_path() {
    let temp_dir = create_test_project(vec![
        (
            "controllers/read_controller.rb",
            "##\n# @resource Widgets\n# Reading\n\n##\n# @path [GET] /w\n# @response 200 OK\n",
        ),
        (
            "controllers/write_controller.rb",
            "##\n# @resource Writers\n\n##\n# @path [POST] /w\n# @response 201 Created\n",
        ),
    ]);

    let docs = parse_dirs(&[temp_dir.path().join("controllers")]);
    assert!(docs.diagnostics.is_empty());

    let compounds = group_by_path(docs.endpoints.clone());
    assert_eq!(compounds.len(), 1);
    assert_eq!(compounds[0].resource, "Widgets");

    let json = to_json(&generate(docs));
    let verbs: Vec<&String> = json["paths"]["/w"].as_object().unwrap().keys().collect();
    assert_eq!(verbs, vec!["get", "post"]);
    assert_eq!(json["paths"]["/w"]["post"]["tags"], json!(["Writers"]));
    assert_eq!(json["tags"].as_array().unwrap().len(), 2);
}

#[test]
fn test_duplicate_operation_last_block_wins() {
    let temp_dir = create_test_project(vec![(
        "widgets_controller.rb",
        "##\n# @resource Widgets\n\n##\n# First\n# @path [GET] /w\n\n##\n# Second\n# @path [GET] /w\n",
    )]);

    let docs = parse_dirs(&[temp_dir.path().to_path_buf()]);
    let compounds = group_by_path(docs.endpoints);

    let duplicates = find_duplicate_operations(&compounds);
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0].is_warning());

    let json = to_json(&OpenApiBuilder::new().build(compounds, docs.models));
    assert_eq!(json["paths"]["/w"]["get"]["description"], "Second");
}

#[test]
fn test_colon_and_brace_paths_are_one_operation() {
    let temp_dir = create_test_project(vec![(
        "widgets_controller.rb",
        "##\n# @resource Widgets\n\n##\n# First\n# @path [GET] /w/:id\n\n##\n# Second\n# @path [GET] /w/{id}\n",
    )]);

    let docs = parse_dirs(&[temp_dir.path().to_path_buf()]);
    let compounds = group_by_path(docs.endpoints);

    assert_eq!(
        find_duplicate_operations(&compounds),
        vec![ParseError::DuplicateOperation {
            path: "/w/{id}".to_string(),
            method: "GET".to_string(),
        }]
    );

    let json = to_json(&OpenApiBuilder::new().build(compounds, docs.models));
    let paths: Vec<&String> = json["paths"].as_object().unwrap().keys().collect();
    assert_eq!(paths, vec!["/w/{id}"]);
    assert_eq!(json["paths"]["/w/{id}"]["get"]["description"], "Second");
}

#[test]
fn test_tags_described_by_every_resource_on_a_shared_path() {
    let temp_dir = create_test_project(vec![
        (
            "a.rb",
            "##\n# @resource Readers\n# Reading things\n\n##\n# @path [GET] /w\n",
        ),
        (
            "b.rb",
            "##\n# @resource Writers\n# Writing things\n\n##\n# @path [POST] /w\n",
        ),
    ]);

    let json = to_json(&generate(parse_dirs(&[temp_dir.path().to_path_buf()])));

    assert_eq!(
        json["tags"],
        json!([
            {"name": "Readers", "description": "Reading things"},
            {"name": "Writers", "description": "Writing things"}
        ])
    );
}

#[test]
fn test_malformed_block_does_not_stop_the_file() {
    let temp_dir = create_test_project(vec![(
        "widgets_controller.rb",
        "##\n# @resource Widgets\n\n##\n# @path [PATCH] /w\n\n##\n# @path [GET] /w\n# @response 200 OK\n",
    )]);

    let docs = parse_dirs(&[temp_dir.path().to_path_buf()]);

    assert_eq!(docs.endpoints.len(), 1);
    assert_eq!(docs.diagnostics.len(), 1);
    assert!(matches!(
        docs.diagnostics[0].error,
        ParseError::MalformedPath { line: 5, .. }
    ));
    assert!(!docs.diagnostics[0].is_warning());
}

#[test]
fn test_custom_grammar() {
    let temp_dir = create_test_project(vec![(
        "widgets.py",
        "#!\n# :resource: Widgets\n\n#!\n# :path: [PUT] /w/:id\n# :response: 200 Saved\n",
    )]);

    let grammar: Grammar = serde_yaml::from_str(
        "block_marker: '#!'\nresource: [':resource:']\npath: [':path:']\nresponse: [':response:']\n",
    )
    .unwrap();

    let files = FileScanner::new(temp_dir.path().to_path_buf())
        .with_extensions(vec!["py".to_string()])
        .scan()
        .unwrap()
        .files;
    let docs = AnnotationParser::new(grammar).parse_files(&files);
    assert!(docs.diagnostics.is_empty());

    let json = to_json(&generate(docs));
    assert_eq!(
        json["paths"]["/w/{id}"]["put"]["responses"]["200"]["description"],
        "Saved"
    );
}

#[test]
fn test_cli_run_with_fixtures() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("openapi.yaml");

    let args = CliArgs {
        model_dirs: vec![fixtures().join("models")],
        controller_dirs: vec![fixtures().join("controllers")],
        output_format: openapi_from_annotations::cli::OutputFormat::Yaml,
        output_path: Some(output.clone()),
        title: "Widget API".to_string(),
        description: None,
        api_version: "2.1.0".to_string(),
        servers: vec!["https://api.example.com".to_string()],
        extensions: vec!["rb".to_string()],
        recursive: false,
        grammar_path: None,
        strict: false,
        verbose: false,
    };
    run(args).expect("Generation should succeed with warnings");

    let parsed: Value = serde_yaml::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(parsed["info"], json!({"title": "Widget API", "version": "2.1.0"}));
    assert_eq!(parsed["servers"], json!([{"url": "https://api.example.com"}]));
    assert!(parsed["components"]["schemas"].get("Widget").is_some());
}

#[test]
fn test_cli_strict_rejects_orphan_endpoint() {
    let temp_dir = TempDir::new().unwrap();

    let args = CliArgs {
        model_dirs: Vec::new(),
        controller_dirs: vec![fixtures().join("controllers")],
        output_format: openapi_from_annotations::cli::OutputFormat::Json,
        output_path: Some(temp_dir.path().join("openapi.json")),
        title: "Widget API".to_string(),
        description: None,
        api_version: "1.0.0".to_string(),
        servers: Vec::new(),
        extensions: vec!["rb".to_string()],
        recursive: false,
        grammar_path: None,
        strict: true,
        verbose: false,
    };

    assert!(run(args).is_err());
    assert!(!temp_dir.path().join("openapi.json").exists());
}
