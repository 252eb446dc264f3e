pub mod semantic;
pub mod spatial;
