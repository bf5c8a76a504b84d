use crate::error::CensusError;
use crate::types::{NewAnswer, NewQuestion};

pub const MAX_SLUG_LENGTH: usize = 512;
pub const MAX_TITLE_LENGTH: usize = 512;
pub const MAX_SHORT_DESCRIPTION_LENGTH: usize = 1024;

pub fn validate_slug(field: &'static str, value: &str) -> Result<(), CensusError> {
    if value.is_empty() {
        return Err(CensusError::validation(field, "must not be empty"));
    }
    if value.chars().count() > MAX_SLUG_LENGTH {
        return Err(CensusError::validation(
            field,
            format!("must be at most {MAX_SLUG_LENGTH} characters"),
        ));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(CensusError::validation(
            field,
            format!("'{c}' is not allowed, use letters, numbers, underscores or hyphens"),
        ));
    }
    Ok(())
}

pub fn validate_new_question(question: &NewQuestion) -> Result<(), CensusError> {
    validate_slug("code", &question.code)?;

    if question.title.trim().is_empty() {
        return Err(CensusError::validation("title", "must not be empty"));
    }
    // Measured untrimmed: the title is stored as given.
    if question.title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CensusError::validation(
            "title",
            format!("must be at most {MAX_TITLE_LENGTH} characters"),
        ));
    }
    if question.short_description.chars().count() > MAX_SHORT_DESCRIPTION_LENGTH {
        return Err(CensusError::validation(
            "short_description",
            format!("must be at most {MAX_SHORT_DESCRIPTION_LENGTH} characters"),
        ));
    }
    Ok(())
}

pub fn validate_new_answer(answer: &NewAnswer) -> Result<(), CensusError> {
    validate_slug("value", &answer.value)?;
    if answer.text.trim().is_empty() {
        return Err(CensusError::validation("text", "must not be empty"));
    }
    Ok(())
}
