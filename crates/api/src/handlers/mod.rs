pub mod health;
pub mod platform;
pub mod tenancy;
