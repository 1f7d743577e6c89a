pub mod accounts;
pub mod providers;
