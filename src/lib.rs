pub mod configure;
pub mod dispatch;
pub mod errors;
pub mod exchange;
pub mod logger;
pub mod models;
