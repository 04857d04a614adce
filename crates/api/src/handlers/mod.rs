pub mod annotations;
pub mod table;
pub mod uploads;
