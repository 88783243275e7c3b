pub mod codes;
pub mod dates;
pub mod text;
