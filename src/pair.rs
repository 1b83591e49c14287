//! Token pair value type plus the redacting wrapper that keeps credentials out of logs.

// self
use crate::_prelude::*;

/// Redacted token string wrapper keeping credential material out of logs.
///
/// Tokens are opaque to the coordinator; the wrapper only controls formatting and comparison.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the wrapped token is the empty string.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Immutable access/refresh credential bundle with structural equality.
///
/// The default pair carries two empty strings and acts as the "no tokens yet" sentinel rather
/// than an error state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	/// Access token presented to resource servers.
	pub access_token: TokenSecret,
	/// Refresh token consumed when minting the next pair.
	pub refresh_token: TokenSecret,
}
impl TokenPair {
	/// Builds a pair from the provided access and refresh tokens.
	pub fn new(access: impl Into<TokenSecret>, refresh: impl Into<TokenSecret>) -> Self {
		Self { access_token: access.into(), refresh_token: refresh.into() }
	}

	/// Returns `true` when both tokens are empty, i.e. the pair is still the sentinel value.
	pub fn is_empty(&self) -> bool {
		self.access_token.is_empty() && self.refresh_token.is_empty()
	}
}
