//! Turns `validator` results into the inline messages the pages show.

use validator::{ValidationError, ValidationErrors};

/// A form field as it is labelled on the page.
pub(crate) struct Field<'a> {
    name: &'static str,
    label: &'static str,
    value: &'a str,
}

impl<'a> Field<'a> {
    pub(crate) fn new(name: &'static str, label: &'static str, value: &'a str) -> Self {
        Self { name, label, value }
    }
}

/// One message per rejected field, in the order `fields` lists them.
pub(crate) fn messages(result: Result<(), ValidationErrors>, fields: &[Field<'_>]) -> Vec<String> {
    let Err(errors) = result else {
        return Vec::new();
    };
    let by_field = errors.field_errors();

    fields
        .iter()
        .filter_map(|field| {
            let first = by_field.get(field.name)?.first()?;
            Some(describe(field, first))
        })
        .collect()
}

fn describe(field: &Field<'_>, error: &ValidationError) -> String {
    if field.value.is_empty() {
        return format!("{} is required.", field.label);
    }

    if error.code == "length" {
        let max = error
            .params
            .get("max")
            .map(ToString::to_string)
            .unwrap_or_default();
        return format!("{} must be at most {} characters.", field.label, max);
    }

    match &error.message {
        Some(message) => message.to_string(),
        None if error.code == "url" || error.code == "web_url" => {
            format!("{} must be a valid URL.", field.label)
        }
        None => format!("{} is invalid.", field.label),
    }
}

/// `validator`'s url check accepts any scheme; images must be fetched over the web.
pub(crate) fn web_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.starts_with("https://") || value.starts_with("http://") {
        return Ok(());
    }

    Err(ValidationError::new("web_url"))
}
