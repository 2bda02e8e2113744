//! API clients for the remote data providers

pub mod alpha_vantage;
pub mod inference;
pub mod news;
pub mod predictor;
pub mod sentiment;
pub mod yahoo;

pub use alpha_vantage::{AlphaVantageClient, Fundamentals};
pub use inference::InferenceClient;
pub use news::NewsApiClient;
pub use predictor::{PredictorClient, PREDICTOR_FEATURES, PREDICTOR_WINDOW};
pub use sentiment::SentimentClient;
pub use yahoo::{Bar, YahooChartClient};
