//! Field rules shared by the registration, login and catalog forms. Messages
//! are shown to end users verbatim.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    domain::is_store_category,
    protocol::{ItemDraft, LoginRequest, RegisterRequest},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("phone pattern compiles"))
}

fn store_name_regex() -> &'static Regex {
    static STORE_NAME: OnceLock<Regex> = OnceLock::new();
    STORE_NAME.get_or_init(|| Regex::new(r"^[a-zA-Z0-9-]+$").expect("store name pattern compiles"))
}

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
    too_short: &str,
    too_long: &str,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::new(field, too_short));
    }
    if len > max {
        return Err(ValidationError::new(field, too_long));
    }
    Ok(())
}

pub fn validate_whatsapp(value: &str) -> Result<(), ValidationError> {
    if phone_regex().is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("whatsapp", "Número de WhatsApp inválido"))
    }
}

pub fn validate_full_name(value: &str) -> Result<(), ValidationError> {
    check_length(
        "full_name",
        value,
        2,
        50,
        "El nombre debe tener al menos 2 caracteres",
        "El nombre no puede exceder 50 caracteres",
    )
}

pub fn validate_password(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < 8 {
        return Err(ValidationError::new(
            "password",
            "La contraseña debe tener al menos 8 caracteres",
        ));
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::new(
            "password",
            "Debe contener al menos una mayúscula",
        ));
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(
            "password",
            "Debe contener al menos un número",
        ));
    }
    Ok(())
}

pub fn validate_store_name(value: &str) -> Result<(), ValidationError> {
    check_length(
        "store_name",
        value,
        2,
        30,
        "El nombre de la tienda debe tener al menos 2 caracteres",
        "El nombre de la tienda no puede exceder 30 caracteres",
    )?;
    if !store_name_regex().is_match(value) {
        return Err(ValidationError::new(
            "store_name",
            "Solo letras, números y guiones permitidos",
        ));
    }
    Ok(())
}

pub fn validate_category(value: &str) -> Result<(), ValidationError> {
    if is_store_category(value) {
        Ok(())
    } else {
        Err(ValidationError::new("category", "Categoría no válida"))
    }
}

pub fn validate_register(req: &RegisterRequest) -> Result<(), ValidationError> {
    validate_full_name(&req.full_name)?;
    validate_whatsapp(&req.whatsapp)?;
    validate_password(&req.password)?;
    validate_store_name(&req.store_name)
}

pub fn validate_login(req: &LoginRequest) -> Result<(), ValidationError> {
    validate_whatsapp(&req.whatsapp)?;
    if req.password.is_empty() {
        return Err(ValidationError::new(
            "password",
            "La contraseña es requerida",
        ));
    }
    Ok(())
}

pub fn validate_item_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("name", "El nombre es requerido"));
    }
    Ok(())
}

/// Upper bound on a catalog price. Together with [`MAX_LINE_QUANTITY`] it keeps
/// every cart total far inside `Decimal`'s range.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Most units of one item a single order may carry.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

pub fn validate_unit_price(value: Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new(
            "unit_price",
            "El precio no puede ser negativo",
        ));
    }
    if value > MAX_UNIT_PRICE {
        return Err(ValidationError::new(
            "unit_price",
            "El precio supera el máximo permitido",
        ));
    }
    Ok(())
}

pub fn validate_item(draft: &ItemDraft) -> Result<(), ValidationError> {
    validate_item_name(&draft.name)?;
    validate_unit_price(draft.unit_price)
}
