pub mod generate;
pub mod lua;
pub mod validate;
