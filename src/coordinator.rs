//! Single-flight coordination of token reads, refreshes, and overwrites.
//!
//! The coordinator exposes [`TokenCoordinator::refresh_tokens`] so callers can request a fresh
//! pair without worrying about concurrent refreshes. The first caller to find no cycle in
//! flight becomes the leader: it invokes the external refresher and settles the shared
//! [`RefreshCycle`] exactly once. Every other caller that arrives while the cycle is open,
//! whether through [`TokenCoordinator::refresh_tokens`] or
//! [`TokenCoordinator::get_tokens`], attaches to the same cycle and observes the same outcome.
//! [`TokenCoordinator::update_tokens`] overwrites the current pair unconditionally and never
//! suspends.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	obs::{self, OpKind, OpOutcome, OpSpan},
	pair::TokenPair,
	refresher::TokenRefresher,
};

/// Outcome broadcast to every caller attached to one refresh cycle.
type CycleOutcome = Result<TokenPair>;

/// Serves the current token pair to any number of concurrent readers, refreshes it on demand
/// with at-most-one-concurrent-refresh semantics, and allows unconditional replacement.
///
/// One coordinator is constructed per client session and holds no external resources, so no
/// teardown is needed. Wrap it in an [`Arc`] to share it across tasks.
///
/// When an explicit [`update_tokens`](Self::update_tokens) races with an in-flight refresh, the
/// chronologically later write determines the final pair: a refresh that settles after the
/// update overwrites it with its own, possibly staler, result. This last-write-wins policy is
/// deliberate; callers that need an update to win permanently must avoid interleaving the two.
pub struct TokenCoordinator {
	refresher: Arc<dyn TokenRefresher>,
	state: Mutex<CoordinatorState>,
	refresh_metrics: RefreshMetrics,
}
impl TokenCoordinator {
	/// Creates a coordinator that starts from the empty sentinel pair.
	pub fn new(refresher: impl 'static + TokenRefresher) -> Self {
		Self::with_initial_tokens(refresher, TokenPair::default())
	}

	/// Creates a coordinator seeded with a known-good initial pair.
	pub fn with_initial_tokens(
		refresher: impl 'static + TokenRefresher,
		initial: TokenPair,
	) -> Self {
		Self {
			refresher: Arc::new(refresher),
			state: Mutex::new(CoordinatorState { current: initial, in_flight: None }),
			refresh_metrics: RefreshMetrics::default(),
		}
	}

	/// Returns the current pair, converging with any in-flight refresh.
	///
	/// When no refresh is running this resolves immediately with the current pair and never
	/// fails. When a cycle is in flight the call suspends until that cycle settles and returns
	/// its outcome: the refreshed pair on success, the cycle's [`RefreshError`] on failure.
	pub async fn get_tokens(&self) -> Result<TokenPair> {
		let span = OpSpan::new(OpKind::Get, "get_tokens");

		span.instrument(async move {
			let cycle = {
				let state = self.state.lock();

				match &state.in_flight {
					Some(cycle) => cycle.clone(),
					None => return Ok(state.current.clone()),
				}
			};

			cycle.join().await
		})
		.await
	}

	/// Refreshes the current pair, deduplicating concurrent requests into one cycle.
	///
	/// Joins the in-flight cycle when one exists, so the refresher is invoked at most once per
	/// logical refresh regardless of how many callers request it concurrently. Otherwise a new
	/// cycle starts: on success the new pair atomically replaces the current one and every
	/// attached waiter resolves with it; on failure the current pair is left untouched and
	/// every waiter receives a [`RefreshError`] wrapping the refresher's reason. A call made
	/// after the prior cycle has settled always invokes the refresher again; outcomes are never
	/// cached across cycles.
	pub async fn refresh_tokens(&self) -> Result<TokenPair> {
		const KIND: OpKind = OpKind::Refresh;

		let span = OpSpan::new(KIND, "refresh_tokens");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let (cycle, leader) = {
					let mut state = self.state.lock();

					match &state.in_flight {
						Some(cycle) => (cycle.clone(), false),
						None => {
							let cycle = Arc::new(RefreshCycle::default());

							state.in_flight = Some(cycle.clone());

							(cycle, true)
						},
					}
				};

				if leader { self.run_cycle(cycle).await } else { cycle.join().await }
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// Unconditionally overwrites the current pair. Never suspends.
	///
	/// An in-flight refresh is not cancelled: when it later settles successfully it overwrites
	/// the pair installed here (last-write-wins, see the type-level docs).
	pub fn update_tokens(&self, pair: TokenPair) {
		let _guard = OpSpan::new(OpKind::Update, "update_tokens").entered();

		self.state.lock().current = pair;
	}

	/// Snapshot of the current pair, ignoring any in-flight refresh.
	///
	/// Diagnostic companion to [`get_tokens`](Self::get_tokens): it never suspends and never
	/// observes a torn pair, but it may return a value an in-flight cycle is about to replace.
	pub fn current_tokens(&self) -> TokenPair {
		self.state.lock().current.clone()
	}

	/// Returns the per-cycle refresh counters.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.refresh_metrics
	}

	/// Leader path: runs the external refresher and settles the cycle exactly once.
	async fn run_cycle(&self, cycle: Arc<RefreshCycle>) -> CycleOutcome {
		self.refresh_metrics.record_attempt();

		let mut guard = CycleGuard { coordinator: self, cycle: &cycle, armed: true };
		let outcome = self.refresher.refresh().await.map_err(RefreshError::from_reason);

		guard.armed = false;

		self.settle(&cycle, outcome.clone());

		outcome
	}

	/// Publishes a cycle's outcome: installs the pair on success, clears the in-flight slot,
	/// then releases every attached waiter.
	fn settle(&self, cycle: &Arc<RefreshCycle>, outcome: CycleOutcome) {
		{
			let mut state = self.state.lock();

			if let Ok(pair) = &outcome {
				state.current = pair.clone();
			}
			// Only clear the slot if it still holds this cycle.
			if state.in_flight.as_ref().is_some_and(|active| Arc::ptr_eq(active, cycle)) {
				state.in_flight = None;
			}
		}

		match &outcome {
			Ok(_) => self.refresh_metrics.record_success(),
			Err(_) => self.refresh_metrics.record_failure(),
		}

		let _ = cycle.outcome.set_blocking(outcome);
	}
}
impl Debug for TokenCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("TokenCoordinator")
			.field("current", &state.current)
			.field("refresh_in_flight", &state.in_flight.is_some())
			.finish()
	}
}

struct CoordinatorState {
	current: TokenPair,
	in_flight: Option<Arc<RefreshCycle>>,
}

/// One logical refresh cycle: settled exactly once, shared by every attached waiter.
///
/// A fresh cycle is allocated per refresh so settled outcomes can never leak into a later
/// cycle.
#[derive(Default)]
struct RefreshCycle {
	outcome: AsyncOnceCell<CycleOutcome>,
}
impl RefreshCycle {
	async fn join(&self) -> CycleOutcome {
		self.outcome.wait().await.clone()
	}
}
impl Debug for RefreshCycle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RefreshCycle(..)")
	}
}

/// Settles the cycle with an error if the leader is dropped mid-refresh, so attached waiters
/// are released instead of suspended forever.
struct CycleGuard<'a> {
	coordinator: &'a TokenCoordinator,
	cycle: &'a Arc<RefreshCycle>,
	armed: bool,
}
impl Drop for CycleGuard<'_> {
	fn drop(&mut self) {
		if self.armed {
			self.coordinator.settle(self.cycle, Err(RefreshError::abandoned()));
		}
	}
}
