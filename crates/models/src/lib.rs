pub mod billing;
pub mod error;
pub mod principal;
pub mod resolution;
pub mod role;
pub mod tenant;

pub use billing::*;
pub use error::ModelError;
pub use principal::*;
pub use resolution::*;
pub use role::*;
pub use tenant::*;
