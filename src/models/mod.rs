pub mod assignment;
pub mod location;
pub mod sos;
