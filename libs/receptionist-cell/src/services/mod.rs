pub mod arguments;
pub mod dispatcher;
pub mod formatter;
pub mod phrasing;

pub use dispatcher::ToolDispatcher;
pub use formatter::ResponseFormatter;
pub use phrasing::GenerativePhraser;
