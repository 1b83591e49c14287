// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use tokio::time::{Duration, sleep};
// self
use token_coordinator::{
	coordinator::TokenCoordinator,
	error::RefreshError,
	pair::TokenPair,
	refresher::BoxError,
};

fn pair(access: &str, refresh: &str) -> TokenPair {
	TokenPair::new(access, refresh)
}

fn idle_coordinator(initial: TokenPair) -> TokenCoordinator {
	TokenCoordinator::with_initial_tokens(
		|| std::future::pending::<Result<TokenPair, BoxError>>(),
		initial,
	)
}

#[tokio::test]
async fn default_tokens_are_empty() {
	let coordinator = TokenCoordinator::new(|| std::future::pending::<Result<TokenPair, BoxError>>());
	let tokens = coordinator.get_tokens().await.expect("Idle read should never fail.");

	assert!(tokens.is_empty());
	assert_eq!(tokens.access_token.expose(), "");
	assert_eq!(tokens.refresh_token.expose(), "");
}

#[tokio::test]
async fn initial_tokens_are_served() {
	let coordinator = idle_coordinator(pair("seed-access", "seed-refresh"));

	assert_eq!(
		coordinator.get_tokens().await,
		Ok(pair("seed-access", "seed-refresh")),
	);
}

#[tokio::test]
async fn explicit_update_is_visible_immediately() {
	let coordinator = idle_coordinator(TokenPair::default());

	coordinator.update_tokens(pair("updated-access", "updated-refresh"));

	assert_eq!(
		coordinator.get_tokens().await,
		Ok(pair("updated-access", "updated-refresh")),
	);

	// Each further overwrite is applied immediately; the last one wins.
	coordinator.update_tokens(pair("later-access", "later-refresh"));
	coordinator.update_tokens(pair("latest-access", "latest-refresh"));

	assert_eq!(coordinator.get_tokens().await, Ok(pair("latest-access", "latest-refresh")));
}

#[tokio::test]
async fn refresh_installs_the_new_pair() {
	let calls = Arc::new(AtomicUsize::new(0));
	let coordinator = TokenCoordinator::with_initial_tokens(
		{
			let calls = calls.clone();

			move || {
				let calls = calls.clone();

				async move {
					calls.fetch_add(1, Ordering::SeqCst);
					sleep(Duration::from_millis(10)).await;

					Ok(pair("new-access", "new-refresh"))
				}
			}
		},
		pair("old-access", "old-refresh"),
	);
	// The read is issued while the refresh is still in flight, so it must converge on the
	// refreshed pair rather than the stale snapshot.
	let (refreshed, observed) =
		tokio::join!(coordinator.refresh_tokens(), coordinator.get_tokens());

	assert_eq!(refreshed, Ok(pair("new-access", "new-refresh")));
	assert_eq!(observed, Ok(pair("new-access", "new-refresh")));
	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(coordinator.current_tokens(), pair("new-access", "new-refresh"));
}

#[tokio::test]
async fn settled_cycles_are_never_reused() {
	let calls = Arc::new(AtomicUsize::new(0));
	let coordinator = TokenCoordinator::new({
		let calls = calls.clone();

		move || {
			let n = calls.fetch_add(1, Ordering::SeqCst);

			async move { Ok(TokenPair::new(format!("access-{n}"), format!("refresh-{n}"))) }
		}
	});

	assert_eq!(
		coordinator.refresh_tokens().await,
		Ok(pair("access-0", "refresh-0")),
	);
	assert_eq!(
		coordinator.refresh_tokens().await,
		Ok(pair("access-1", "refresh-1")),
	);
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failures_are_not_cached_across_cycles() {
	let calls = Arc::new(AtomicUsize::new(0));
	let coordinator = TokenCoordinator::new({
		let calls = calls.clone();

		move || {
			let n = calls.fetch_add(1, Ordering::SeqCst);

			async move {
				if n == 0 {
					Err("transient failure".into())
				} else {
					Ok(pair("recovered-access", "recovered-refresh"))
				}
			}
		}
	});

	assert_eq!(
		coordinator.refresh_tokens().await,
		Err(RefreshError::new("transient failure")),
	);
	// No automatic retry happened inside the coordinator; the caller triggers the next cycle.
	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(
		coordinator.refresh_tokens().await,
		Ok(pair("recovered-access", "recovered-refresh")),
	);
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_refresh_leaves_current_untouched() {
	let coordinator = TokenCoordinator::with_initial_tokens(
		|| async { Err::<TokenPair, _>("network down".into()) },
		pair("seed-access", "seed-refresh"),
	);

	assert_eq!(coordinator.refresh_tokens().await, Err(RefreshError::new("network down")));
	// A reader issued after the cycle has already failed is unaffected.
	assert_eq!(coordinator.get_tokens().await, Ok(pair("seed-access", "seed-refresh")));
}

#[tokio::test]
async fn update_after_settlement_wins() {
	let coordinator =
		TokenCoordinator::new(|| async { Ok(pair("refreshed-access", "refreshed-refresh")) });

	coordinator
		.refresh_tokens()
		.await
		.expect("Refresh against an immediate refresher should succeed.");
	coordinator.update_tokens(pair("updated-access", "updated-refresh"));

	// The explicit update is the chronologically later write.
	assert_eq!(coordinator.get_tokens().await, Ok(pair("updated-access", "updated-refresh")));
}
