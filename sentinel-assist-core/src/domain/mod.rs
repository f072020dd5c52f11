pub mod outcome;
pub mod records;
pub mod time;
pub mod types;
