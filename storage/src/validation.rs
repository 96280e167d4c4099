//! Input checks that run before a transaction is opened, so a rejected write
//! leaves no row, no audit entry and no count change behind.

use crate::error::{Result, StorageError};

pub const NEGATIVE_CHAPTER_NUMBER: &str = "Chapter number must be non-negative";
pub const NON_POSITIVE_PAGE_NUMBER: &str = "Page number must be positive";
pub const EMPTY_TITLE: &str = "Manga title must not be empty";
pub const EMPTY_IMAGE_URL: &str = "Image URL must not be empty";

pub fn chapter_number(number: f64) -> Result<()> {
    // NaN fails both comparisons, so it is rejected here too.
    if number.is_finite() && number >= 0.0 {
        Ok(())
    } else {
        Err(StorageError::Validation(NEGATIVE_CHAPTER_NUMBER.to_string()))
    }
}

pub fn page_number(number: i64) -> Result<()> {
    if number >= 1 {
        Ok(())
    } else {
        Err(StorageError::Validation(NON_POSITIVE_PAGE_NUMBER.to_string()))
    }
}

pub fn manga_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(StorageError::Validation(EMPTY_TITLE.to_string()));
    }
    Ok(())
}

pub fn image_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(StorageError::Validation(EMPTY_IMAGE_URL.to_string()));
    }
    Ok(())
}
