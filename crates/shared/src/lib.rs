pub mod access;
pub mod cart;
pub mod checkout;
pub mod domain;
pub mod error;
pub mod money;
pub mod protocol;
pub mod schedule;
pub mod validation;
