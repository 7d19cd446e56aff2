mod common;

mod node_types_test;
mod setup_flow_test;
mod templates_test;
