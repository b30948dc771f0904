use crate::utils::error::AppError;

/// Collects absent request fields so a handler can report all of them at once.
///
/// Strings count as absent when they are `None` or blank after trimming.
#[derive(Debug, Default)]
pub struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, name: &'static str, value: &Option<String>) -> String {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    /// Like [`Required::text`] but keeps the value byte for byte (passwords)
    pub fn secret(&mut self, name: &'static str, value: &Option<String>) -> String {
        match value {
            Some(v) if !v.is_empty() => v.clone(),
            _ => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    pub fn value<T: Copy + Default>(&mut self, name: &'static str, value: Option<T>) -> T {
        match value {
            Some(v) => v,
            None => {
                self.missing.push(name);
                T::default()
            }
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::MissingFields(self.missing))
        }
    }
}

/// Trims an optional string, dropping it when nothing is left.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
