//! Template engine for workspace queries.
//!
//! The model never writes query text. It picks one of the registered
//! templates and supplies parameters, which are validated against the
//! template's declared schema before any textual substitution happens.

mod builder;
mod resolver;
mod template;

pub use builder::{BuiltQuery, QueryBuildError};
pub use resolver::{
    BIN_SIZES, ResolveError, Severity, TIME_WINDOWS, TimeWindow, default_bin_size,
    resolve_severity, resolve_window, severity_filter,
};
pub use template::{
    LimitPolicy, ParamDefault, ParamKind, ParamSpec, QueryTemplate, TemplateRegistry, TimeoutClass,
    templates,
};
