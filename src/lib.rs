pub mod adapters;
pub mod cache;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::bof::BofApiClient;
pub use cache::{Cache, CacheExt, MemoryCache, RedisCache};
pub use config::{build_cache, CacheBackend, CliConfig};
pub use core::service::EuroNoteService;
pub use domain::model::{
    BankNoteFilters, BankNoteObservation, BankNoteSummary, CurrencyValue, DENOMINATIONS,
};
pub use domain::ports::BankNoteApi;
pub use utils::error::{NoteError, Result};
