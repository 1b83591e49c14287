//! Coordinator error surface shared by the refresh and read paths.

// self
use crate::{_prelude::*, refresher::BoxError};

/// Crate-wide result alias returning [`RefreshError`] by default.
pub type Result<T, E = RefreshError> = std::result::Result<T, E>;

/// Signals that an in-flight refresh cycle failed.
///
/// Carries the refresher's failure reason in stringified form so it stays opaque to the
/// coordinator. Cloneable so one settled outcome can be broadcast to every caller attached to
/// the failing cycle; the coordinator's current pair is never touched by a failure.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Token refresh failed: {reason}.")]
pub struct RefreshError {
	/// Failure reason reported by the external refresher.
	pub reason: String,
}
impl RefreshError {
	/// Wraps an arbitrary failure reason.
	pub fn new(reason: impl Display) -> Self {
		Self { reason: reason.to_string() }
	}

	pub(crate) fn from_reason(reason: BoxError) -> Self {
		Self::new(reason)
	}

	pub(crate) fn abandoned() -> Self {
		Self::new("refresh future was dropped before settling")
	}
}
