use serde::Deserialize;
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, Default, Validate, Deserialize)]
pub struct SigninValidation {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Validate, Deserialize)]
pub struct SignupValidation {
    #[validate(length(min = 2, message = "Too short"))]
    pub name: String,
    #[validate(length(min = 2, message = "Too short"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Validate, Deserialize)]
pub struct PostValidation {
    #[validate(length(min = 5, max = 2200, message = "Caption must be 5-2200 characters"))]
    pub caption: String,
    #[validate(length(min = 2, max = 100, message = "Location must be 2-100 characters"))]
    pub location: String,
    /// Comma separated
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub image_url: String,
}

impl PostValidation {
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .replace(' ', "")
            .split(',')
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Flatten validator output into `field -> messages`, the shape the form
/// components render under each input.
pub fn field_errors(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
