//! Deep links that hand a checkout message to a messaging service.

use thiserror::Error;
use url::form_urlencoded;

use crate::cart::Cart;

pub const DEFAULT_MESSAGING_HOST: &str = "wa.me";
pub const CONTACT_GREETING: &str = "¡Hola! Me gustaría obtener más información sobre su tienda.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("phone number '{0}' contains no digits")]
    MissingPhone(String),
    #[error("cart is empty")]
    EmptyCart,
}

pub fn sanitize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Percent-encodes like `encodeURIComponent`: spaces become `%20`, not `+`.
pub fn encode_component(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

pub fn message_link(host: &str, phone: &str, message: &str) -> Result<String, CheckoutError> {
    let digits = sanitize_phone(phone);
    if digits.is_empty() {
        return Err(CheckoutError::MissingPhone(phone.to_string()));
    }
    Ok(format!(
        "https://{}/{digits}?text={}",
        host.trim_end_matches('/'),
        encode_component(message)
    ))
}

pub fn checkout_link(
    host: &str,
    phone: &str,
    cart: &Cart,
    notes: Option<&str>,
) -> Result<String, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    message_link(host, phone, &cart.format_checkout_message(notes))
}

pub fn contact_link(host: &str, phone: &str) -> Result<String, CheckoutError> {
    message_link(host, phone, CONTACT_GREETING)
}
