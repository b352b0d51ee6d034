pub mod auth;
pub mod batches;
pub mod clients;
pub mod dashboard;
pub mod expenses;
pub mod receipts;
pub mod reports;
pub mod sales;
pub mod users;
