pub mod agent;
pub mod bootstrap;
pub mod execution;
pub mod projection;
pub mod tooling;
