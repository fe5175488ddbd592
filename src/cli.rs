use crate::classifier::{ControllerClassifier, DEFAULT_BASE_MARKER};
use crate::discovery::EndpointDiscovery;
use crate::filter::FilterSpec;
use crate::openapi_builder::{GeneratorSettings, OpenApiBuilder, DEFAULT_URL_TEMPLATE};
use crate::serializer::{serialize_document, write_to_file};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Generates an OpenAPI specification for the controllers contained in .NET Web API projects
#[derive(Parser, Debug)]
#[command(name = "webapi-to-openapi")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// C# project directories, C# source files, or type catalog manifests (.json/.yaml)
    #[arg(value_name = "MODULE_PATHS", required = true, num_args = 1..)]
    pub module_paths: Vec<PathBuf>,

    /// Limit the results to some controllers; accepts exact names and `*` wildcards
    #[arg(short = 'c', long = "controller", value_name = "NAME")]
    pub controller_names: Vec<String>,

    /// Base type name that marks a controller (repeatable)
    #[arg(short = 'm', long = "base-marker", value_name = "NAME", default_value = DEFAULT_BASE_MARKER)]
    pub base_markers: Vec<String>,

    /// The Web API default URL template (MVC style: '{controller}/{action}/{id?}')
    #[arg(short = 'u', long = "url-template", default_value = DEFAULT_URL_TEMPLATE)]
    pub url_template: String,

    /// Add path parameters for template placeholders missing from the actions
    #[arg(short = 'a', long = "add-missing-path-parameters")]
    pub add_missing_path_parameters: bool,

    /// Title of the specification, ignored when the document template provides one
    #[arg(short = 't', long = "title", default_value = "")]
    pub title: String,

    /// Description of the specification, ignored when the document template provides one
    #[arg(short = 'd', long = "description", default_value = "")]
    pub description: String,

    /// Version of the specification
    #[arg(long = "info-version", default_value = "1.0.0")]
    pub info_version: String,

    /// Document template, given as inline JSON or a path to a JSON/YAML file
    #[arg(long = "document-template", value_name = "JSON_OR_PATH")]
    pub document_template: Option<String>,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl CliArgs {
    /// Settings passed through to document generation
    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            default_url_template: self.url_template.clone(),
            add_missing_path_parameters: self.add_missing_path_parameters,
            title: self.title.clone(),
            description: self.description.clone(),
            version: self.info_version.clone(),
            document_template: self.document_template.clone(),
        }
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if args.url_template.trim().is_empty() {
        anyhow::bail!("URL template must not be empty");
    }

    if let Some(ref output) = args.output_path {
        if output.is_dir() {
            anyhow::bail!("Output path is a directory: {}", output.display());
        }
    }

    for path in &args.module_paths {
        info!("Module: {}", path.display());
    }
    if args.controller_names.is_empty() {
        info!("Controllers: all");
    } else {
        info!("Controllers: {}", args.controller_names.join(", "));
    }
    info!("Base markers: {}", args.base_markers.join(", "));
    info!("URL template: {}", args.url_template);
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    // Step 1: Discover endpoint groups
    let filter = FilterSpec::new(&args.controller_names);
    let discovery = EndpointDiscovery::new(ControllerClassifier::new(args.base_markers.iter()));
    let result = discovery.discover(args.module_paths.as_slice(), Some(&filter))?;

    if result.is_empty() {
        warn!("No controllers found in the given modules");
    } else {
        info!("Generating for controllers:");
        for name in result.names() {
            info!("  {}", name);
        }
    }

    // Step 2: Build OpenAPI document
    info!("Building OpenAPI document...");
    let mut builder = OpenApiBuilder::new(args.generator_settings());
    builder.add_discovery_result(&result);
    let document = builder.build()?;
    info!("OpenAPI document built successfully");

    // Step 3: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = serialize_document(&document, args.output_format)?;

    // Step 4: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Modules loaded: {}", args.module_paths.len());
    info!("  - Controllers documented: {}", result.len());
    info!("  - Paths generated: {}", document.paths.len());

    Ok(())
}
