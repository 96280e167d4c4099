pub mod admin;
pub mod chapter;
pub mod manga;
pub mod page;
