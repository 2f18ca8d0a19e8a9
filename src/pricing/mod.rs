pub mod baseline;
pub mod suggest;
