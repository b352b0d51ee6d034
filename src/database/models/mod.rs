pub mod batch;
pub mod client;
pub mod expense;
pub mod sale;
pub mod user;

pub use batch::Batch;
pub use client::Client;
pub use expense::Expense;
pub use sale::Sale;
pub use user::{Role, UnknownRole, User};
