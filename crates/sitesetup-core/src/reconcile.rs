//! Idempotent "list, match, create-if-absent" reconciliation.
//!
//! The remote service is the only source of truth: every call re-lists the
//! parent scope and matches on names, so running twice against unchanged
//! remote state never creates a second resource.

/// A kind of remote resource that can be listed, matched and created.
#[allow(async_fn_in_trait)]
pub trait Reconcile {
    type Resource;
    type Error;

    /// Human-readable label for log lines, e.g. `"property"`.
    fn kind(&self) -> &'static str;

    /// List every resource in the parent scope.
    async fn list(&self) -> Result<Vec<Self::Resource>, Self::Error>;

    /// `true` if `resource` is the one this target describes.
    fn matches(&self, resource: &Self::Resource) -> bool;

    /// Create the resource with its default attributes.
    async fn create(&self) -> Result<Self::Resource, Self::Error>;
}

/// Whether missing resources are created or only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Apply,
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// A matching resource already existed and was left untouched.
    Existing(T),
    /// No match was found and one resource was created.
    Created(T),
    /// No match was found; creation was skipped in dry-run mode.
    Planned,
}

impl<T> Outcome<T> {
    /// The resource, if one exists remotely after reconciliation.
    pub fn resource(&self) -> Option<&T> {
        match self {
            Outcome::Existing(r) | Outcome::Created(r) => Some(r),
            Outcome::Planned => None,
        }
    }

    pub fn into_resource(self) -> Option<T> {
        match self {
            Outcome::Existing(r) | Outcome::Created(r) => Some(r),
            Outcome::Planned => None,
        }
    }

    /// Short label for console output.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Existing(_) => "existing",
            Outcome::Created(_) => "created",
            Outcome::Planned => "would create",
        }
    }
}

/// Ensure the target resource exists.
///
/// Lists the parent scope and returns the first match. When nothing matches,
/// issues exactly one `create` call (or none in [`Mode::DryRun`]).
///
/// # Errors
///
/// Propagates any error from `list` or `create`.
pub async fn reconcile<R: Reconcile>(
    target: &R,
    mode: Mode,
) -> Result<Outcome<R::Resource>, R::Error> {
    let existing = target.list().await?;
    let total = existing.len();

    if let Some(found) = existing.into_iter().find(|r| target.matches(r)) {
        tracing::debug!(kind = target.kind(), listed = total, "matched existing resource");
        return Ok(Outcome::Existing(found));
    }

    match mode {
        Mode::DryRun => {
            tracing::debug!(kind = target.kind(), listed = total, "no match; dry-run skips create");
            Ok(Outcome::Planned)
        }
        Mode::Apply => {
            tracing::debug!(kind = target.kind(), listed = total, "no match; creating");
            let created = target.create().await?;
            Ok(Outcome::Created(created))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    /// In-memory stand-in for a remote collection keyed by display name.
    struct FakeRemote {
        names: RefCell<Vec<String>>,
        creates: Cell<u32>,
        wanted: String,
    }

    impl FakeRemote {
        fn new(existing: &[&str], wanted: &str) -> Self {
            Self {
                names: RefCell::new(existing.iter().map(|s| (*s).to_string()).collect()),
                creates: Cell::new(0),
                wanted: wanted.to_string(),
            }
        }
    }

    impl Reconcile for FakeRemote {
        type Resource = String;
        type Error = String;

        fn kind(&self) -> &'static str {
            "fake"
        }

        async fn list(&self) -> Result<Vec<String>, String> {
            Ok(self.names.borrow().clone())
        }

        fn matches(&self, resource: &String) -> bool {
            resource.contains(&self.wanted)
        }

        async fn create(&self) -> Result<String, String> {
            self.creates.set(self.creates.get() + 1);
            let name = format!("created {}", self.wanted);
            self.names.borrow_mut().push(name.clone());
            Ok(name)
        }
    }

    struct FailingList;

    impl Reconcile for FailingList {
        type Resource = String;
        type Error = String;

        fn kind(&self) -> &'static str {
            "failing"
        }

        async fn list(&self) -> Result<Vec<String>, String> {
            Err("list exploded".to_string())
        }

        fn matches(&self, _resource: &String) -> bool {
            true
        }

        async fn create(&self) -> Result<String, String> {
            panic!("create must not be called when list fails");
        }
    }

    #[tokio::test]
    async fn existing_resource_is_reused_without_create() {
        let remote = FakeRemote::new(&["Site (a.com)"], "a.com");
        let outcome = reconcile(&remote, Mode::Apply).await.unwrap();
        assert_eq!(outcome, Outcome::Existing("Site (a.com)".to_string()));
        assert_eq!(remote.creates.get(), 0);
    }

    #[tokio::test]
    async fn missing_resource_is_created_exactly_once() {
        let remote = FakeRemote::new(&["Site (a.com)"], "b.com");
        let outcome = reconcile(&remote, Mode::Apply).await.unwrap();
        assert_eq!(outcome, Outcome::Created("created b.com".to_string()));
        assert_eq!(remote.creates.get(), 1);
    }

    #[tokio::test]
    async fn second_run_is_idempotent() {
        let remote = FakeRemote::new(&[], "b.com");
        let first = reconcile(&remote, Mode::Apply).await.unwrap();
        let second = reconcile(&remote, Mode::Apply).await.unwrap();
        assert!(matches!(first, Outcome::Created(_)));
        assert_eq!(second, Outcome::Existing("created b.com".to_string()));
        assert_eq!(remote.creates.get(), 1);
    }

    #[tokio::test]
    async fn first_match_wins_on_ties() {
        let remote = FakeRemote::new(&["one a.com", "two a.com"], "a.com");
        let outcome = reconcile(&remote, Mode::Apply).await.unwrap();
        assert_eq!(outcome.into_resource().as_deref(), Some("one a.com"));
    }

    #[tokio::test]
    async fn dry_run_never_creates() {
        let remote = FakeRemote::new(&[], "b.com");
        let outcome = reconcile(&remote, Mode::DryRun).await.unwrap();
        assert_eq!(outcome, Outcome::Planned);
        assert!(outcome.resource().is_none());
        assert_eq!(remote.creates.get(), 0);
    }

    #[tokio::test]
    async fn dry_run_still_reports_existing() {
        let remote = FakeRemote::new(&["a.com"], "a.com");
        let outcome = reconcile(&remote, Mode::DryRun).await.unwrap();
        assert_eq!(outcome.label(), "existing");
    }

    #[tokio::test]
    async fn list_error_propagates() {
        let err = reconcile(&FailingList, Mode::Apply).await.unwrap_err();
        assert_eq!(err, "list exploded");
    }
}
