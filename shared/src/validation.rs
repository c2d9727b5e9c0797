//! Validation utilities for Stockbook
//!
//! Plain checks return `&'static str` messages. The `validate_*_field`
//! adapters wrap them for `#[validate(custom = "...")]` on request inputs.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Maximum length of item and customer names, after trimming
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum SKU length
pub const MAX_SKU_LENGTH: usize = 64;

/// Image extensions accepted for item image references
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

// ============================================================================
// Inventory Validations
// ============================================================================

/// Validate a SKU: non-empty, bounded, no whitespace or control characters
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.trim().is_empty() {
        return Err("SKU is required");
    }
    if sku.chars().count() > MAX_SKU_LENGTH {
        return Err("SKU must be at most 64 characters");
    }
    if sku.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("SKU cannot contain whitespace");
    }
    Ok(())
}

/// Validate that a monetary amount is not negative
pub fn validate_non_negative(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

/// Validate an image reference: an http(s) URL, or a path ending in one of
/// [`ALLOWED_IMAGE_EXTENSIONS`]
pub fn validate_image_reference(reference: &str) -> Result<(), &'static str> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err("Image reference cannot be empty");
    }
    if reference.starts_with("https://") || reference.starts_with("http://") {
        return Ok(());
    }
    let extension = reference
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or("Image reference must have a file extension")?;
    if ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err("Only jpg, jpeg, png and webp images are allowed")
    }
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate a display name: not blank once trimmed, bounded
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name cannot be blank");
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err("Name must be at most 200 characters");
    }
    Ok(())
}

/// Validate a phone number: 7 to 15 digits, with optional `+`, spaces and dashes
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
    {
        return Err("Phone number contains invalid characters");
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return Err("Phone number must have 7 to 15 digits");
    }
    Ok(())
}

// ============================================================================
// validator adapters
// ============================================================================

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub fn validate_name_field(name: &str) -> Result<(), ValidationError> {
    validate_name(name).map_err(|m| field_error("name", m))
}

pub fn validate_sku_field(sku: &str) -> Result<(), ValidationError> {
    validate_sku(sku).map_err(|m| field_error("sku", m))
}

pub fn validate_non_negative_field(amount: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(*amount).map_err(|m| field_error("range", m))
}

pub fn validate_image_field(reference: &str) -> Result<(), ValidationError> {
    validate_image_reference(reference).map_err(|m| field_error("image", m))
}

pub fn validate_phone_field(phone: &str) -> Result<(), ValidationError> {
    validate_phone(phone).map_err(|m| field_error("phone", m))
}
