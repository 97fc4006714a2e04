use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use proswipe_core::{Capabilities, CapabilityApi};

/// One lookup, tagged with the generation of the email field it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    generation: u64,
    email: String,
}

impl LookupRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Why a lookup produced no usable capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownReason {
    NotFound,
    LookupFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The field was empty; no request was made.
    Cleared,
    Found(Capabilities),
    /// Treated like an unknown account by the form.
    Unknown(UnknownReason),
    /// A newer request was issued while this one was waiting or in flight.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub request: LookupRequest,
    pub outcome: ResolutionOutcome,
}

/// Looks up which roles an email's account has, debouncing keystrokes and dropping
/// responses that arrive after a newer lookup was issued.
///
/// Clones share the same generation counter.
pub struct CapabilityResolver<C>
where
    C: CapabilityApi,
{
    inner: Arc<Inner<C>>,
}

struct Inner<C> {
    api: C,
    generation: AtomicU64,
    debounce: Duration,
}

impl<C> Clone for CapabilityResolver<C>
where
    C: CapabilityApi,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> CapabilityResolver<C>
where
    C: CapabilityApi,
{
    pub fn new(api: C, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                generation: AtomicU64::new(0),
                debounce,
            }),
        }
    }

    pub fn api(&self) -> &C {
        &self.inner.api
    }

    pub fn debounce(&self) -> Duration {
        self.inner.debounce
    }

    /// Registers a new value of the email field. Every earlier request becomes stale.
    pub fn begin(&self, email: &str) -> LookupRequest {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LookupRequest {
            generation,
            email: email.trim().to_string(),
        }
    }

    pub fn is_current(&self, request: &LookupRequest) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == request.generation
    }

    /// Resolves immediately, without waiting for the debounce window.
    #[tracing::instrument(name = "CapabilityResolver::resolve", skip(self))]
    pub async fn resolve(&self, request: LookupRequest) -> Resolution {
        if request.email.is_empty() {
            return Resolution {
                request,
                outcome: ResolutionOutcome::Cleared,
            };
        }
        if !self.is_current(&request) {
            return superseded(request);
        }

        let response = self.inner.api.user_capabilities(&request.email).await;

        // The field may have changed while the request was in flight.
        if !self.is_current(&request) {
            tracing::debug!(generation = request.generation, "Dropping stale capability response");
            return superseded(request);
        }

        let outcome = match response {
            Ok(Some(capabilities)) if capabilities.is_known() => {
                ResolutionOutcome::Found(capabilities)
            }
            Ok(_) => ResolutionOutcome::Unknown(UnknownReason::NotFound),
            Err(e) => {
                tracing::warn!(error = %e, "Capability lookup failed");
                ResolutionOutcome::Unknown(UnknownReason::LookupFailed(e.to_string()))
            }
        };
        Resolution { request, outcome }
    }

    /// Registers `email` and resolves it once the field has been quiet for the
    /// debounce window. A later call during the window supersedes this one.
    #[tracing::instrument(name = "CapabilityResolver::resolve_debounced", skip(self))]
    pub async fn resolve_debounced(&self, email: &str) -> Resolution {
        let request = self.begin(email);
        if request.email.is_empty() {
            return Resolution {
                request,
                outcome: ResolutionOutcome::Cleared,
            };
        }

        tokio::time::sleep(self.inner.debounce).await;

        if !self.is_current(&request) {
            return superseded(request);
        }
        self.resolve(request).await
    }
}

fn superseded(request: LookupRequest) -> Resolution {
    Resolution {
        request,
        outcome: ResolutionOutcome::Superseded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockCapabilityApi, caps};
    use proswipe_core::Role;

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn resolver(api: &MockCapabilityApi) -> CapabilityResolver<MockCapabilityApi> {
        CapabilityResolver::new(api.clone(), DEBOUNCE)
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_clears_without_a_request() {
        let api = MockCapabilityApi::default();
        let resolver = resolver(&api);

        let resolution = resolver.resolve_debounced("   ").await;

        assert_eq!(resolution.outcome, ResolutionOutcome::Cleared);
        assert!(api.lookups().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn known_account_is_found_after_the_debounce_window() {
        let api = MockCapabilityApi::default()
            .with_account("jo@example.com", caps("u1", true, false, None));
        let resolver = resolver(&api);
        let started = tokio::time::Instant::now();

        let resolution = resolver.resolve_debounced("jo@example.com").await;

        assert!(started.elapsed() >= DEBOUNCE);
        assert_eq!(
            resolution.outcome,
            ResolutionOutcome::Found(caps("u1", true, false, None))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_and_failed_lookups_are_both_unknown() {
        let api = MockCapabilityApi::default();
        let resolver = resolver(&api);

        let missing = resolver.resolve(resolver.begin("nobody@example.com")).await;
        assert_eq!(
            missing.outcome,
            ResolutionOutcome::Unknown(UnknownReason::NotFound)
        );

        api.fail_next_lookups(1);
        let failed = resolver.resolve(resolver.begin("nobody@example.com")).await;
        assert!(matches!(
            failed.outcome,
            ResolutionOutcome::Unknown(UnknownReason::LookupFailed(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn account_without_roles_is_unknown() {
        let api = MockCapabilityApi::default()
            .with_account("ghost@example.com", caps("u9", false, false, None));
        let resolver = resolver(&api);

        let resolution = resolver.resolve(resolver.begin("ghost@example.com")).await;

        assert_eq!(
            resolution.outcome,
            ResolutionOutcome::Unknown(UnknownReason::NotFound)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn typing_within_the_window_sends_a_single_request() {
        let api = MockCapabilityApi::default()
            .with_account("b@example.com", caps("u2", false, true, None));
        let resolver = resolver(&api);

        let first = resolver.resolve_debounced("b@example.co");
        let second = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            resolver.resolve_debounced("b@example.com").await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.outcome, ResolutionOutcome::Superseded);
        assert_eq!(
            second.outcome,
            ResolutionOutcome::Found(caps("u2", false, true, None))
        );
        assert_eq!(api.lookups(), vec!["b@example.com".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_response_for_an_older_email_is_discarded() {
        let api = MockCapabilityApi::default()
            .with_account("a@example.com", caps("ua", true, false, None))
            .with_account("b@example.com", caps("ub", true, true, Some(Role::Contractor)));
        api.delay_for("a@example.com", Duration::from_secs(2));
        api.delay_for("b@example.com", Duration::from_millis(50));
        let resolver = resolver(&api);

        let older = resolver.resolve(resolver.begin("a@example.com"));
        let newer = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            resolver.resolve(resolver.begin("b@example.com")).await
        };
        let (older, newer) = tokio::join!(older, newer);

        assert_eq!(older.outcome, ResolutionOutcome::Superseded);
        assert!(resolver.is_current(&newer.request));
        assert_eq!(
            newer.outcome,
            ResolutionOutcome::Found(caps("ub", true, true, Some(Role::Contractor)))
        );
    }
}
