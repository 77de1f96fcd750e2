pub mod eta;
pub mod ingest;
pub mod sos;
pub mod tracking_window;
