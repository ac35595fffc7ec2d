pub mod binance;
pub mod brapi;
pub mod treasury;
pub mod util;
pub mod yahoo;

pub use binance::BinanceProvider;
pub use brapi::BrapiProvider;
pub use treasury::TreasuryProvider;
pub use yahoo::YahooProvider;
