//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{CopyRepository, EquipmentRepository, LoanRepository, UserRepository};
use crate::infrastructure::{
    SeaOrmCopyRepository, SeaOrmEquipmentRepository, SeaOrmLoanRepository, SeaOrmUserRepository,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Copy documents (inventory groups)
    pub copy_repo: Arc<dyn CopyRepository>,
    /// Borrow records
    pub loan_repo: Arc<dyn LoanRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub equipment_repo: Arc<dyn EquipmentRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        let copy_repo = Arc::new(SeaOrmCopyRepository::new(db.clone()));
        let loan_repo = Arc::new(SeaOrmLoanRepository::new(db.clone()));
        let user_repo = Arc::new(SeaOrmUserRepository::new(db.clone()));
        let equipment_repo = Arc::new(SeaOrmEquipmentRepository::new(db));

        Self {
            copy_repo,
            loan_repo,
            user_repo,
            equipment_repo,
        }
    }
}
