//! Agent tools selection, on-demand builds and uploads.

mod build;
mod ensure;
mod resolve;
mod select;

pub use build::build_on_demand;
pub use ensure::ensure_tools_availability;
pub use resolve::{resolve_tools, ToolsRequest, ToolsSelection};
pub use select::{select_tools, SelectionPolicy};
