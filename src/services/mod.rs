pub mod batch_planner;
pub mod message_template;

pub use batch_planner::{needs_batching, plan};
pub use message_template::{MessageTemplate, TemplateVars};
