use serde::Deserialize;

use crate::models::{MAX_RATING, MIN_RATING, is_valid_rating};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> impl Iterator<Item = &str> {
        self.0.iter().filter(move |e| e.field == field).map(|e| e.message.as_str())
    }

    fn collect<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.0.push(err);
                None
            },
        }
    }
}

/// Raw edit form as posted by the browser.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidEdit {
    pub rating: f64,
    pub review: String,
}

impl EditForm {
    pub fn validate(&self) -> Result<ValidEdit, FieldErrors> {
        let mut errors = FieldErrors::default();
        let rating = errors.collect(validate_rating(&self.rating));
        let review = errors.collect(required("review", &self.review));

        match (rating, review) {
            (Some(rating), Some(review)) => Ok(ValidEdit { rating, review }),
            _ => Err(errors),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AddForm {
    #[serde(default)]
    pub title: String,
}

impl AddForm {
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.collect(required("title", &self.title)).ok_or(errors)
    }
}

pub fn validate_rating(raw: &str) -> Result<f64, FieldError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FieldError::new("rating", "This field is required."));
    }

    let value: f64 =
        raw.parse().map_err(|_| FieldError::new("rating", "Not a valid number."))?;

    if !is_valid_rating(value) {
        return Err(FieldError::new(
            "rating",
            format!("Enter a number between {MIN_RATING} and {MAX_RATING}."),
        ));
    }

    Ok(value)
}

pub fn required(field: &'static str, raw: &str) -> Result<String, FieldError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(FieldError::new(field, "This field is required."));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(rating: &str, review: &str) -> EditForm {
        EditForm { rating: rating.to_string(), review: review.to_string() }
    }

    #[test]
    fn accepts_rating_in_range() {
        let valid = edit("7.5", " great ").validate().unwrap();
        assert_eq!(valid, ValidEdit { rating: 7.5, review: "great".to_string() });

        assert!(edit("0", "ok").validate().is_ok());
        assert!(edit("10", "ok").validate().is_ok());
    }

    #[test]
    fn rejects_rating_out_of_range() {
        for raw in ["11", "-1", "10.01", "NaN", "inf"] {
            let errors = edit(raw, "great").validate().unwrap_err();
            assert_eq!(errors.for_field("rating").count(), 1, "{raw}");
            assert_eq!(errors.for_field("review").count(), 0);
        }
    }

    #[test]
    fn rejects_non_numeric_rating() {
        let errors = edit("seven", "great").validate().unwrap_err();
        assert_eq!(errors.for_field("rating").collect::<Vec<_>>(), ["Not a valid number."]);
    }

    #[test]
    fn reports_every_bad_field() {
        let errors = edit("", "   ").validate().unwrap_err();
        assert_eq!(errors.for_field("rating").count(), 1);
        assert_eq!(errors.for_field("review").count(), 1);
    }

    #[test]
    fn title_is_required() {
        let form = AddForm { title: "  ".to_string() };
        assert!(form.validate().unwrap_err().for_field("title").next().is_some());

        let form = AddForm { title: " Heat ".to_string() };
        assert_eq!(form.validate().unwrap(), "Heat");
    }
}
