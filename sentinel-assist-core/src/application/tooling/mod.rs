//! The fixed set of operations the model may call.
//!
//! - `operation` - operation names and status lines
//! - `schema` - tool definitions sent with every model call
//! - `dispatcher` - name → operation routing with one silent retry
//! - `preview` - one-line summaries of tool results for the transparency log

mod dispatcher;
mod operation;
mod preview;
mod schema;

pub use dispatcher::ToolDispatcher;
pub use operation::{DEFAULT_STATUS, Operation};
pub use preview::preview;
pub use schema::tool_definitions;
