pub mod client;
pub mod otlp;

pub use client::MetricsExporter;
