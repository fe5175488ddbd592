//! Web API to OpenAPI - controller discovery and OpenAPI generation for .NET Web API projects.
//!
//! This library finds the API controllers ("endpoint groups") declared by .NET Web API
//! projects and produces an OpenAPI 3.0 document listing them. Modules are read statically:
//! C# sources and project directories are scanned for type declarations, and type catalog
//! manifests (JSON/YAML dumps of a module's types) are read as-is.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans C# project directories for source files
//! 2. [`catalog`] - Loads modules into type descriptors with resolved base chains
//! 3. [`classifier`] - Decides which types are controllers
//! 4. [`filter`] - Matches controller names against literal and wildcard patterns
//! 5. [`discovery`] - Runs the load → classify → filter → dedup pipeline
//! 6. [`openapi_builder`] - Constructs the OpenAPI document from the discovered controllers
//! 7. [`serializer`] - Serializes the document to JSON or YAML
//!
//! # Example Usage
//!
//! ```no_run
//! use webapi_to_openapi::{
//!     discovery::EndpointDiscovery,
//!     filter::FilterSpec,
//!     openapi_builder::{GeneratorSettings, OpenApiBuilder},
//!     serializer::serialize_json,
//! };
//! use std::path::PathBuf;
//!
//! let filter = FilterSpec::new(["Orders*"]);
//! let result = EndpointDiscovery::default()
//!     .discover(&[PathBuf::from("./Shop.Api")], Some(&filter))
//!     .unwrap();
//!
//! let mut builder = OpenApiBuilder::new(GeneratorSettings::default());
//! builder.add_discovery_result(&result);
//! let document = builder.build().unwrap();
//!
//! println!("{}", serialize_json(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod openapi_builder;
pub mod scanner;
pub mod serializer;
