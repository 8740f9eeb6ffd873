pub mod jwt;

pub use jwt::{AppClaims, AppTokenMinter};
