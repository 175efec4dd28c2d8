pub mod service;

pub use crate::domain::model::{BankNoteFilters, BankNoteSummary, CurrencyValue};
pub use crate::domain::ports::BankNoteApi;
pub use crate::utils::error::Result;
pub use service::EuroNoteService;
