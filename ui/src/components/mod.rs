pub mod catalog;
pub mod credentials;
pub mod list_filter;
pub mod node_types;
pub mod preview;
pub mod setup;
pub mod toast;
pub mod wizard;
