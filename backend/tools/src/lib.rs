pub mod scan;

pub use scan::{default_registry, ScanBase64Tool, ScanFileTool, ScanUrlTool};
