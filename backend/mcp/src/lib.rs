pub mod server;

pub use server::{McpServer, SERVER_NAME};
