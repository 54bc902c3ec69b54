mod resource;
mod search;
mod status;
pub mod subsidy;
mod types;
pub mod validate;
pub mod workflow;

pub use resource::Resource;
pub use search::{matches_query, Searchable};
pub use status::*;
pub use subsidy::{estimate, estimate_from_input, PanelType, SubsidyEstimate, SubsidyRates};
pub use types::*;
pub use validate::{Validate, ValidationError};
pub use workflow::{WorkflowError, WorkflowStep};
