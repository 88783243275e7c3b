pub mod book_copy;
pub mod borrow_record;
pub mod equipment;
pub mod user;
