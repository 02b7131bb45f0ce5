/// Authentication module
///
/// Claims encoding, token issuance, password verification and the
/// refresh-token cookie.

mod claims;
mod cookie;
mod issuer;
mod jwt;
mod password;

pub use claims::{Claims, TokenKind};
pub use cookie::{read_refresh_cookie, refresh_cookie, removal_cookie, REFRESH_COOKIE_NAME};
pub use issuer::{IssuedToken, TokenIssuer, TokenPair};
pub use jwt::JwtCodec;
pub use password::{hash_password, verify_dummy_password, verify_password};
