pub mod error;
pub mod jwt;

pub use error::{AuthError, Result};
pub use jwt::{Claims, JwtService, TokenType};
