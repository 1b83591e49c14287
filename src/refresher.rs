//! External refresher contract that produces new token pairs on demand.

// self
use crate::{_prelude::*, pair::TokenPair};

/// Opaque failure reason surfaced by a [`TokenRefresher`].
pub type BoxError = Box<dyn 'static + Send + Sync + StdError>;
/// Boxed future returned by [`TokenRefresher::refresh`].
pub type RefreshFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TokenPair, BoxError>> + 'a + Send>>;

/// External collaborator invoked by the coordinator whenever a new refresh cycle starts.
///
/// The refresher owns everything the coordinator deliberately does not, from building and
/// transporting the refresh call to any retry policy around it. It takes no input and either
/// resolves with a fresh [`TokenPair`] or fails with an arbitrary reason.
///
/// Any `Fn() -> Fut` closure returning a compatible future satisfies the contract via the
/// blanket implementation below.
pub trait TokenRefresher
where
	Self: Send + Sync,
{
	/// Produces a new token pair or fails with an opaque reason.
	fn refresh(&self) -> RefreshFuture<'_>;
}
impl<F, Fut> TokenRefresher for F
where
	F: Send + Sync + Fn() -> Fut,
	Fut: 'static + Send + Future<Output = Result<TokenPair, BoxError>>,
{
	fn refresh(&self) -> RefreshFuture<'_> {
		Box::pin(self())
	}
}
