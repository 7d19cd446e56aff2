pub mod console_navigator;
pub mod file_store;
pub mod http_client;

pub use console_navigator::ConsoleNavigator;
pub use file_store::FileStore;
pub use http_client::HttpClient;
