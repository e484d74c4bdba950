use std::fmt;

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

/// SHA-256 fingerprint of compiled text, rendered as `sha256:<hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
	pub const PREFIX: &'static str = "sha256:";

	pub fn from_content(content: &str) -> Self {
		let digest = Sha256::digest(content.as_bytes());
		Self(format!("{}{digest:x}", Self::PREFIX))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The hex digest without the prefix.
	pub fn hex(&self) -> &str {
		self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
	}

	/// First 12 hex characters, for log lines.
	pub fn short(&self) -> &str {
		let hex = self.hex();
		&hex[..hex.len().min(12)]
	}
}

impl fmt::Display for ContentHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl AsRef<str> for ContentHash {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// Hash `content` and return the prefixed hex digest.
pub fn hash_content(content: &str) -> ContentHash {
	ContentHash::from_content(content)
}
