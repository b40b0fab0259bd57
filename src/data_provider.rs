pub mod cache;
pub mod csv_reader;
pub mod error;
pub mod loader;
pub mod pit_view;

pub use cache::{FundamentalTable, PriceTable};
pub use csv_reader::CsvDataProvider;
pub use error::{DataProviderError, DataProviderResult, PitViolationError};
pub use loader::{InMemoryDataProvider, RawDataProvider};
pub use pit_view::PitDataView;
