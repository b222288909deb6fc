pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use config::{AppConfig, ConverterConfig};
pub use error::ConverterError;

// Export logic types
pub use logic::{
    build_patch, build_query, estimated_savings, find_references, find_references_at,
    format_bytes, resolve_query, scan_documents, ConversionObserver, ConversionPipeline,
    LogObserver, NoopObserver, ProgressEvent, ReferenceConverter,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{DocumentStore, HttpDocumentStore, InMemoryStore, Patch, PatchBuilder, PatchOperation};
