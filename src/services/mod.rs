//! Operations spanning several repositories.
pub mod checkout;
pub mod sales;
