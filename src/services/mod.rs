// Services: widget-facing orchestration over the query and series modules.

pub mod trend;
