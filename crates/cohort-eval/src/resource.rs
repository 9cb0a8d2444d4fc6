//! Resource projection
//!
//! Matching works over a JSON tree shaped like a FHIR resource. Callers may
//! hand the evaluator an already parsed tree or raw JSON text; anything else
//! can implement [`ResourceProjection`] to expose its own view.

use std::borrow::Cow;

use serde_json::Value;
use thiserror::Error;

/// Failure to obtain a resource's JSON view
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Resource is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A value that can be viewed as a resource JSON tree
pub trait ResourceProjection {
    fn project(&self) -> Result<Cow<'_, Value>, ProjectionError>;
}

impl ResourceProjection for Value {
    fn project(&self) -> Result<Cow<'_, Value>, ProjectionError> {
        Ok(Cow::Borrowed(self))
    }
}

impl ResourceProjection for str {
    fn project(&self) -> Result<Cow<'_, Value>, ProjectionError> {
        Ok(Cow::Owned(serde_json::from_str(self)?))
    }
}

impl ResourceProjection for String {
    fn project(&self) -> Result<Cow<'_, Value>, ProjectionError> {
        self.as_str().project()
    }
}

/// Raw resource JSON text, parsed on every projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResource(pub String);

impl RawResource {
    pub fn new(json: impl Into<String>) -> Self {
        Self(json.into())
    }
}

impl ResourceProjection for RawResource {
    fn project(&self) -> Result<Cow<'_, Value>, ProjectionError> {
        self.0.project()
    }
}

impl<T: ResourceProjection + ?Sized> ResourceProjection for &T {
    fn project(&self) -> Result<Cow<'_, Value>, ProjectionError> {
        (**self).project()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_is_borrowed() {
        let resource = json!({"resourceType": "Person", "id": "p1"});
        assert!(matches!(resource.project().unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_text_is_parsed() {
        let text = r#"{"resourceType": "Person", "gender": "female"}"#;
        let projected = text.project().unwrap();
        assert_eq!(projected["gender"], json!("female"));
        assert!("{not json".to_string().project().is_err());
        assert!(RawResource::new("[1,").project().is_err());
    }
}
