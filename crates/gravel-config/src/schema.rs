use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::GravelConfig;

/// JSON schema for `gravel.toml`, for editor tooling and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    let mut schema = schema_for!(GravelConfig);
    if let Some(metadata) = schema.schema.metadata.as_mut() {
        metadata.title = Some("gravel.toml".to_owned());
    }
    schema
}
