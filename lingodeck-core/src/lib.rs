pub mod clock;
pub mod errors;
pub mod filters;
pub mod models;
pub mod repo;
pub mod scheduler;
pub mod service;
pub mod validation;

pub use clock::*;
pub use errors::*;
pub use filters::*;
pub use models::*;
pub use repo::*;
pub use scheduler::*;
pub use service::*;
pub use validation::*;
