pub mod backend;
pub mod knowledge;
pub mod model;
