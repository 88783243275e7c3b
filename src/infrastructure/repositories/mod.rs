//! Repository implementations using SeaORM

pub mod copy_repository;
pub mod equipment_repository;
pub mod loan_repository;
pub mod user_repository;

pub use copy_repository::SeaOrmCopyRepository;
pub use equipment_repository::SeaOrmEquipmentRepository;
pub use loan_repository::SeaOrmLoanRepository;
pub use user_repository::SeaOrmUserRepository;
