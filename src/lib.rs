//! OpenAPI from annotations - OpenAPI 3.0 documents from documentation tags in source comments.
//!
//! Controllers and models describe their HTTP surface with `@`-tags inside comment blocks:
//!
//! ```text
//! ##
//! # @resource Widgets
//! # Everything about widgets
//!
//! ##
//! # Fetch one widget
//! # @path [GET] /widgets/{id}
//! # @parameter id(path) [integer] Widget id
//! # @response 200 Found
//! # @response_type [Widget]
//! ```
//!
//! This library reads those comments (it never evaluates the surrounding code) and assembles
//! one OpenAPI 3.0 document from them.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Lists the source files of the model and controller directories
//! 2. [`grammar`] - Marker table and the line classifier built from it
//! 3. [`block`] - Splits a file into comment blocks
//! 4. [`endpoint`] and [`model`] - Field parsers for endpoint, resource and model blocks
//! 5. [`parser`] - Runs the above over whole files and collects diagnostics
//! 6. [`aggregator`] - Groups endpoints by path, one operation per HTTP verb
//! 7. [`openapi_builder`] - Constructs the OpenAPI document
//! 8. [`serializer`] - Serializes the document to JSON or YAML
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_annotations::{
//!     aggregator::group_by_path,
//!     grammar::Grammar,
//!     openapi_builder::OpenApiBuilder,
//!     parser::AnnotationParser,
//!     scanner::FileScanner,
//!     serializer::serialize_json,
//! };
//! use std::path::PathBuf;
//!
//! let scan_result = FileScanner::new(PathBuf::from("./app/controllers")).scan().unwrap();
//!
//! let parser = AnnotationParser::new(Grammar::default());
//! let docs = parser.parse_files(&scan_result.files);
//! for diagnostic in &docs.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//!
//! let document = OpenApiBuilder::new().build(group_by_path(docs.endpoints), docs.models);
//! println!("{}", serialize_json(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod aggregator;
pub mod block;
pub mod cli;
pub mod endpoint;
pub mod error;
pub mod grammar;
pub mod model;
pub mod openapi_builder;
pub mod parser;
pub mod scanner;
pub mod serializer;
