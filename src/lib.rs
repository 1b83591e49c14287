//! Single-flight token coordination for shared access/refresh credential pairs.
//!
//! A [`TokenCoordinator`](coordinator::TokenCoordinator) holds the latest known-good
//! [`TokenPair`](pair::TokenPair) and guarantees that, no matter how many concurrent callers read
//! tokens or request a refresh, at most one refresh runs at a time and every attached caller
//! converges on its single outcome. Building the actual refresh request is the caller's job,
//! supplied as a [`TokenRefresher`](refresher::TokenRefresher) at construction.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod coordinator;
pub mod error;
pub mod obs;
pub mod pair;
pub mod refresher;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience fixtures for coordinator tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use crate::{
		pair::TokenPair,
		refresher::{RefreshFuture, TokenRefresher},
	};

	/// Builds a token pair fixture from plain strings.
	pub fn pair(access: &str, refresh: &str) -> TokenPair {
		TokenPair::new(access, refresh)
	}

	/// Gate-controlled refresher handle for driving in-flight cycles from tests.
	///
	/// Every refresh invocation is counted and stays pending until the test releases the gate
	/// with a single shared outcome. Cloning yields another handle to the same gate.
	#[derive(Clone, Default)]
	pub struct GateRefresher(Arc<GateState>);
	impl GateRefresher {
		/// Returns how many times the coordinator invoked this refresher.
		pub fn calls(&self) -> usize {
			self.0.calls.load(Ordering::SeqCst)
		}

		/// Releases every pending refresh with the provided pair.
		pub fn release(&self, pair: TokenPair) {
			self.0.gate.set_blocking(Ok(pair)).ok();
		}

		/// Releases every pending refresh with a failure reason.
		pub fn fail(&self, reason: impl Into<String>) {
			self.0.gate.set_blocking(Err(reason.into())).ok();
		}
	}
	impl TokenRefresher for GateRefresher {
		fn refresh(&self) -> RefreshFuture<'_> {
			self.0.calls.fetch_add(1, Ordering::SeqCst);

			let state = self.0.clone();

			Box::pin(async move {
				match state.gate.wait().await.clone() {
					Ok(pair) => Ok(pair),
					Err(reason) => Err(reason.into()),
				}
			})
		}
	}
	impl Debug for GateRefresher {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.debug_struct("GateRefresher").field("calls", &self.calls()).finish()
		}
	}

	#[derive(Default)]
	struct GateState {
		calls: AtomicUsize,
		gate: AsyncOnceCell<Result<TokenPair, String>>,
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::OnceCell as AsyncOnceCell;
	pub use parking_lot::Mutex;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;

	pub use crate::error::{RefreshError, Result};
}
