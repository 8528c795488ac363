pub mod client;

pub use client::{MarketDataGateway, YahooClient};
