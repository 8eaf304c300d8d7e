use crate::block::{extract_blocks, BlockKind};
use crate::endpoint::{parse_endpoint_block, parse_resource_block, Endpoint, Resource};
use crate::error::{Diagnostic, ParseError};
use crate::grammar::{Grammar, LineClassifier};
use crate::model::{parse_model_block, Model};
use anyhow::{Context, Result};
use log::{debug, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Annotation parser for documented source files.
///
/// The `AnnotationParser` splits each file into annotation blocks and hands every block to the
/// endpoint or model field parser. Problems are collected as [`Diagnostic`]s instead of aborting,
/// so one bad block only costs that block.
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::grammar::Grammar;
/// use openapi_from_annotations::parser::AnnotationParser;
/// use std::path::Path;
///
/// let parser = AnnotationParser::new(Grammar::default());
/// let parsed = parser.parse_file(Path::new("app/controllers/widgets_controller.rb")).unwrap();
/// println!("Parsed {} endpoints", parsed.endpoints.len());
/// ```
pub struct AnnotationParser {
    classifier: LineClassifier,
}

/// Everything extracted from one or more files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocs {
    /// Endpoints in source order
    pub endpoints: Vec<Endpoint>,
    /// Models in source order
    pub models: Vec<Model>,
    /// Problems found along the way
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedDocs {
    /// Appends `other` after the records already collected.
    pub fn merge(&mut self, other: ParsedDocs) {
        self.endpoints.extend(other.endpoints);
        self.models.extend(other.models);
        self.diagnostics.extend(other.diagnostics);
    }

    /// True when neither endpoints nor models were found
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty() && self.models.is_empty()
    }
}

impl AnnotationParser {
    pub fn new(grammar: Grammar) -> Self {
        Self {
            classifier: LineClassifier::new(grammar),
        }
    }

    /// Parses the text of one file.
    ///
    /// Endpoint blocks need a preceding `@resource` block in the same file; endpoint blocks
    /// without one are skipped and reported once per file as
    /// [`ParseError::MissingResourceContext`].
    pub fn parse_source(&self, file: &Path, source: &str) -> ParsedDocs {
        let mut docs = ParsedDocs::default();
        let mut resource: Option<Resource> = None;
        let mut orphaned: Option<usize> = None;
        let mut model_warnings = Vec::new();

        for block in extract_blocks(&self.classifier, source) {
            match block.kind() {
                BlockKind::Resource => {
                    let parsed = parse_resource_block(&block);
                    debug!("Resource '{}' in {}", parsed.name, file.display());
                    resource = Some(parsed);
                }
                BlockKind::Endpoint => match &resource {
                    Some(resource) => match parse_endpoint_block(&block, resource) {
                        Ok(endpoint) => {
                            debug!("Endpoint {} {}", endpoint.method, endpoint.path);
                            docs.endpoints.push(endpoint);
                        }
                        Err(e) => docs.diagnostics.push(Diagnostic::new(file, e)),
                    },
                    None => {
                        orphaned.get_or_insert(block.start_line());
                    }
                },
                BlockKind::Model => {
                    let model = parse_model_block(&block, &self.classifier, &mut model_warnings);
                    debug!("Model '{}' with {} properties", model.name, model.properties.len());
                    docs.models.push(model);
                }
                BlockKind::Commentary => {}
            }
        }

        if let Some(line) = orphaned {
            docs.diagnostics.push(Diagnostic::new(
                file,
                ParseError::MissingResourceContext { line },
            ));
        }
        docs.diagnostics.extend(
            model_warnings
                .into_iter()
                .map(|warning| Diagnostic::new(file, warning)),
        );

        docs
    }

    /// Reads and parses a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read. Annotation problems are not errors; they are
    /// returned in [`ParsedDocs::diagnostics`].
    pub fn parse_file(&self, path: &Path) -> Result<ParsedDocs> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let docs = self.parse_source(path, &content);
        debug!(
            "Parsed {}: {} endpoints, {} models",
            path.display(),
            docs.endpoints.len(),
            docs.models.len()
        );
        Ok(docs)
    }

    /// Parses many files in parallel, continuing past files that cannot be read.
    ///
    /// Results are merged in the order of `paths`, so the output does not depend on
    /// scheduling. Unreadable files become [`ParseError::Io`] diagnostics.
    pub fn parse_files(&self, paths: &[PathBuf]) -> ParsedDocs {
        debug!("Parsing {} files", paths.len());

        let per_file: Vec<ParsedDocs> = paths
            .par_iter()
            .map(|path| match self.parse_file(path) {
                Ok(docs) => docs,
                Err(e) => {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                    ParsedDocs {
                        diagnostics: vec![Diagnostic::new(
                            path.as_path(),
                            ParseError::Io {
                                message: format!("{:#}", e),
                            },
                        )],
                        ..ParsedDocs::default()
                    }
                }
            })
            .collect();

        let mut merged = ParsedDocs::default();
        for docs in per_file {
            merged.merge(docs);
        }

        debug!(
            "Parsing complete: {} endpoints, {} models, {} diagnostics",
            merged.endpoints.len(),
            merged.models.len(),
            merged.diagnostics.len()
        );

        merged
    }
}

impl Default for AnnotationParser {
    fn default() -> Self {
        Self::new(Grammar::default())
    }
}
