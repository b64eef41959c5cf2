pub mod candle;
pub mod env;
pub mod service_config;
pub mod text;
