//! Cadastro - registration form core
//!
//! Input masks for CPF, phone and CEP fields, the form session that owns
//! the field values, and the CEP address lookup used to autofill the
//! extended form.

pub mod app;
pub mod config;
pub mod lookup;
pub mod mask;
pub mod state;
