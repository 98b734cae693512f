pub mod engine;
pub mod models;
pub mod portfolio;


pub use engine::{earliest_statement_date, run};
pub use models::{Portfolio, PortfolioStock, PortfolioTransaction, TransactionKind};
