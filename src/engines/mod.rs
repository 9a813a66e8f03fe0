pub mod splitters;
pub mod validation;
