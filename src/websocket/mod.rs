pub mod case_stream;
pub mod hub;
