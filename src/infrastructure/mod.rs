pub mod backends;
pub mod views;
