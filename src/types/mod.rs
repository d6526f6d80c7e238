pub mod record;
pub mod track;
pub mod weather;
