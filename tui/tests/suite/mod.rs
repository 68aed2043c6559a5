// Aggregates all integration tests as modules.
mod composer_flow;
mod harness;
mod navigation_flow;
