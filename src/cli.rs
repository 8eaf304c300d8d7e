use crate::error::{Diagnostic, ParseError};
use crate::grammar::Grammar;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Generate an OpenAPI 3.0 document from documentation tags in source comments
#[derive(Parser, Debug)]
#[command(name = "openapi-from-annotations")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Directory containing documented model sources (repeatable)
    #[arg(short = 'm', long = "models", value_name = "DIR")]
    pub model_dirs: Vec<PathBuf>,

    /// Directory containing documented controller sources (repeatable)
    #[arg(short = 'c', long = "controllers", value_name = "DIR")]
    pub controller_dirs: Vec<PathBuf>,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Document title
    #[arg(long = "title", default_value = "Generated API")]
    pub title: String,

    /// Document description
    #[arg(long = "description")]
    pub description: Option<String>,

    /// Document version
    #[arg(long = "api-version", default_value = "1.0.0")]
    pub api_version: String,

    /// Server URL (repeatable)
    #[arg(long = "server", value_name = "URL")]
    pub servers: Vec<String>,

    /// File extension to scan (repeatable)
    #[arg(short = 'e', long = "extension", value_name = "EXT", default_value = "rb")]
    pub extensions: Vec<String>,

    /// Descend into subdirectories
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    /// YAML or JSON file overriding the annotation markers
    #[arg(long = "grammar", value_name = "FILE")]
    pub grammar_path: Option<PathBuf>,

    /// Treat every diagnostic as fatal
    #[arg(long = "strict")]
    pub strict: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if args.model_dirs.is_empty() && args.controller_dirs.is_empty() {
        anyhow::bail!("No source directories given. Use --models and/or --controllers");
    }

    for dir in args.model_dirs.iter().chain(&args.controller_dirs) {
        if !dir.exists() {
            anyhow::bail!("Directory does not exist: {}", dir.display());
        }
        if !dir.is_dir() {
            anyhow::bail!("Path is not a directory: {}", dir.display());
        }
    }

    if let Some(ref grammar) = args.grammar_path {
        if !grammar.is_file() {
            anyhow::bail!("Grammar file does not exist: {}", grammar.display());
        }
    }

    info!("Model directories: {:?}", args.model_dirs);
    info!("Controller directories: {:?}", args.controller_dirs);
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if args.strict {
        info!("Strict mode: any diagnostic is fatal");
    }

    Ok(args)
}

/// Loads a grammar table from a YAML or JSON file (JSON is valid YAML).
pub fn load_grammar(path: &Path) -> Result<Grammar> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read grammar file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid grammar file: {}", path.display()))
}

/// Logs each diagnostic at a level matching its severity.
fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        if diagnostic.is_warning() {
            warn!("{}", diagnostic);
        } else {
            error!("{}", diagnostic);
        }
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::aggregator::{find_duplicate_operations, group_by_path};
    use crate::openapi_builder::OpenApiBuilder;
    use crate::parser::AnnotationParser;
    use crate::scanner::FileScanner;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};

    info!("Starting OpenAPI document generation...");

    // Step 1: Load the grammar
    let grammar = match &args.grammar_path {
        Some(path) => {
            info!("Loading grammar from {}", path.display());
            load_grammar(path)?
        }
        None => Grammar::default(),
    };

    // Step 2: Scan directories, models first
    info!("Scanning source directories...");
    let mut files: Vec<PathBuf> = Vec::new();
    let mut scan_diagnostics = Vec::new();
    let mut seen = HashSet::new();
    for dir in args.model_dirs.iter().chain(&args.controller_dirs) {
        let scan_result = FileScanner::new(dir.clone())
            .with_extensions(args.extensions.clone())
            .recursive(args.recursive)
            .scan()?;
        debug!("Found {} files in {}", scan_result.files.len(), dir.display());
        scan_diagnostics.extend(
            scan_result
                .warnings
                .into_iter()
                .map(|message| Diagnostic::new(dir.as_path(), ParseError::Io { message })),
        );
        files.extend(
            scan_result
                .files
                .into_iter()
                .filter(|f| seen.insert(f.clone())),
        );
    }

    info!("Found {} source files", files.len());
    if files.is_empty() {
        anyhow::bail!("No source files found in the given directories");
    }

    // Step 3: Parse annotation blocks
    info!("Parsing annotations...");
    let parser = AnnotationParser::new(grammar);
    let mut docs = parser.parse_files(&files);
    scan_diagnostics.append(&mut docs.diagnostics);
    docs.diagnostics = scan_diagnostics;
    info!(
        "Parsed {} endpoints and {} models",
        docs.endpoints.len(),
        docs.models.len()
    );

    if docs.is_empty() {
        report(&docs.diagnostics);
        anyhow::bail!("No endpoints or models could be parsed");
    }

    // Step 4: Group endpoints by path
    let compounds = group_by_path(std::mem::take(&mut docs.endpoints));
    docs.diagnostics.extend(
        find_duplicate_operations(&compounds)
            .into_iter()
            .map(|e| Diagnostic::new(PathBuf::new(), e)),
    );

    report(&docs.diagnostics);
    if args.strict && !docs.diagnostics.is_empty() {
        anyhow::bail!(
            "{} diagnostic(s) reported in strict mode",
            docs.diagnostics.len()
        );
    }

    // Step 5: Build OpenAPI document
    info!("Building OpenAPI document...");
    let path_count = compounds.len();
    let model_count = docs.models.len();
    let document = OpenApiBuilder::new()
        .with_info(args.title, args.api_version, args.description)
        .with_servers(args.servers)
        .build(compounds, docs.models);

    // Step 6: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Json => serialize_json(&document)?,
        OutputFormat::Yaml => serialize_yaml(&document)?,
    };

    // Step 7: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    // Step 8: Display summary
    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", files.len());
    info!("  - Paths: {}", path_count);
    info!("  - Models: {}", model_count);
    info!("  - Diagnostics: {}", docs.diagnostics.len());

    Ok(())
}
