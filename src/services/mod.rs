pub mod comparator;
pub mod config;
pub mod difficulty_analyzer;
pub mod model_server;
pub mod ocr;
pub mod uploads;
