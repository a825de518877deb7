use rand::RngCore;
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;

/// Opaque bearer credential identifying a player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Draws two independent 64-bit values and concatenates them as 32 hex digits.
///
/// Tokens are not checked against the ones already issued; a collision of
/// 128 random bits is not defended against.
pub fn issue_token<R: RngCore + ?Sized>(rng: &mut R) -> Token {
    let high = rng.next_u64();
    let low = rng.next_u64();
    Token(format!("{:016x}{:016x}", high, low))
}
