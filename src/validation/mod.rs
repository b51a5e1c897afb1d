//! Offline validation of pipeline inputs

pub mod api_config;
pub mod dataset;

pub use api_config::{
    create_validated_config, validate_and_write, ApiConfigReport, ApiConfigValidator, Capabilities,
};
pub use dataset::{DatasetValidationReport, DatasetValidator, SourcesManifest};
