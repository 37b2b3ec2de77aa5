//! Verb handling over a versioned store
//!
//! [`ResourceHandler`] turns a (verb, precondition, store result) triple into
//! an [`Outcome`]. It holds no per-request state and no locks; every call is
//! independent, keyed by resource id. Preconditions are checked twice: once
//! against an advisory pre-load for a fast rejection, and authoritatively by
//! the store's atomic compare-and-swap. Only the store call decides races.

use uuid::Uuid;

use crate::etag::{self, EntityTag};
use crate::model::{ModelVersion, Outcome};
use crate::policy::ResourcePolicy;
use crate::precondition;
use crate::store::{StoreError, StoreErrorKind, VersionedStore};
use http::Method;

/// Stateless verb handler for one resource type.
pub struct ResourceHandler<M, S> {
    store: S,
    policy: ResourcePolicy,
    _model: std::marker::PhantomData<fn() -> M>,
}

impl<M, S> ResourceHandler<M, S>
where
    M: Clone + Send + Sync,
    S: VersionedStore<M>,
{
    pub fn new(store: S, policy: ResourcePolicy) -> Self {
        Self {
            store,
            policy,
            _model: std::marker::PhantomData,
        }
    }

    pub fn policy(&self) -> &ResourcePolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// GET: current state, `NotModified` on a conditional hit.
    pub async fn get(&self, id: &str, if_none_match: Option<&EntityTag>) -> Outcome<M> {
        if !self.policy.allows(&Method::GET) {
            return Outcome::UnsupportedOperation;
        }
        self.read(id, if_none_match).await
    }

    /// HEAD: same decision as GET; the boundary drops the body.
    pub async fn head(&self, id: &str, if_none_match: Option<&EntityTag>) -> Outcome<M> {
        if !self.policy.allows(&Method::HEAD) {
            return Outcome::UnsupportedOperation;
        }
        self.read(id, if_none_match).await
    }

    /// Shared read path. GET and HEAD gate on their own policy entry before
    /// calling this, so allowing one verb does not require the other.
    async fn read(&self, id: &str, if_none_match: Option<&EntityTag>) -> Outcome<M> {
        let scope = self.policy.scope_for(id);
        let current = match self.store.load(id).await {
            Ok(current) => current,
            Err(error) => return fault("load", error),
        };
        match current {
            None => self.missing(id),
            Some(state) => {
                if precondition::is_not_modified(if_none_match, Some(&state), &scope) {
                    tracing::debug!(id, "conditional read matched current version");
                    Outcome::NotModified
                } else {
                    Outcome::Ok {
                        value: state,
                        created: false,
                        id: None,
                    }
                }
            }
        }
    }

    /// PUT: upsert at a client-supplied id.
    ///
    /// Without `If-Match` this is an unconditional create-or-overwrite.
    /// With `If-Match`, a failed precondition or a losing race both surface
    /// as `PreconditionFailed`.
    pub async fn put(&self, id: &str, model: M, if_match: Option<&EntityTag>) -> Outcome<M> {
        if !self.policy.allows(&Method::PUT) {
            return Outcome::UnsupportedOperation;
        }
        let scope = self.policy.scope_for(id);
        let expected = match if_match {
            None => None,
            Some(tag) => {
                // Advisory early rejection; the CAS below is authoritative.
                let current = match self.store.load(id).await {
                    Ok(current) => current,
                    Err(error) => return fault("load", error),
                };
                if !precondition::if_match(Some(tag), current.as_ref(), &scope) {
                    tracing::debug!(id, "If-Match precondition rejected before write");
                    return Outcome::PreconditionFailed;
                }
                match self.expected_version(tag, &scope) {
                    Ok(expected) => expected,
                    Err(outcome) => return outcome,
                }
            }
        };
        match self.store.compare_and_swap(id, model, expected).await {
            Ok(written) => {
                tracing::debug!(id, version = written.version(), "write accepted");
                versioned(written, if_match.is_none(), None)
            }
            Err(error) if error.is_concurrency_conflict() => {
                tracing::debug!(id, %error, "write lost optimistic-lock race");
                Outcome::PreconditionFailed
            }
            Err(error) => fault("compare_and_swap", error),
        }
    }

    /// POST: create-only at a server-generated id. Returns the id through
    /// the outcome for `Location` rendering.
    pub async fn post(&self, model: M, if_match: Option<&EntityTag>) -> Outcome<M> {
        if !self.policy.allows(&Method::POST) {
            return Outcome::UnsupportedOperation;
        }
        let id = Uuid::new_v4().to_string();
        // The id was just generated, so no precondition pre-check is useful;
        // a supplied tag is only decoded into an advisory expected value.
        let scope = self.policy.scope_for(&id);
        let expected = if_match
            .and_then(EntityTag::token)
            .and_then(|token| etag::decode(token, &scope));
        match self.store.create(&id, model, expected).await {
            Ok(written) => {
                tracing::debug!(id, "resource created");
                versioned(written, true, Some(id))
            }
            Err(error) if error.kind == StoreErrorKind::AlreadyExists => {
                tracing::warn!(id, "generated identifier collided with existing resource");
                Outcome::Conflict
            }
            Err(error) => fault("create", error),
        }
    }

    /// DELETE: unconditional deletes are idempotent; conditional deletes
    /// fail the precondition when the version is stale or the resource
    /// vanished after the advisory check.
    pub async fn delete(&self, id: &str, if_match: Option<&EntityTag>) -> Outcome<M> {
        if !self.policy.allows(&Method::DELETE) {
            return Outcome::UnsupportedOperation;
        }
        let scope = self.policy.scope_for(id);
        let expected = match if_match {
            None => None,
            Some(tag) => {
                let current = match self.store.load(id).await {
                    Ok(current) => current,
                    Err(error) => return fault("load", error),
                };
                if !precondition::if_match(Some(tag), current.as_ref(), &scope) {
                    tracing::debug!(id, "If-Match precondition rejected before delete");
                    return Outcome::PreconditionFailed;
                }
                match self.expected_version(tag, &scope) {
                    Ok(expected) => expected,
                    Err(outcome) => return outcome,
                }
            }
        };
        match self.store.delete(id, expected).await {
            Ok(()) => {
                tracing::debug!(id, "resource deleted");
                Outcome::Deleted
            }
            Err(error) if error.is_not_found() => {
                if expected.is_some() {
                    // Passed the advisory check but the resource is gone now.
                    Outcome::PreconditionFailed
                } else {
                    Outcome::Deleted
                }
            }
            Err(error) if error.is_concurrency_conflict() => {
                tracing::debug!(id, %error, "delete lost optimistic-lock race");
                Outcome::PreconditionFailed
            }
            Err(error) => fault("delete", error),
        }
    }

    /// PATCH is a pass-through, unimplemented by default.
    pub fn patch(&self) -> Outcome<M> {
        Outcome::UnsupportedOperation
    }

    /// OPTIONS: the static per-resource-type method set.
    pub fn options(&self) -> &[Method] {
        self.policy.methods()
    }

    /// Decode a matched tag into the expected version for the store call.
    /// Wildcard means "any version" (unconditional); a token that fails to
    /// decode can never match a live resource.
    ///
    /// Wildcard leaves a window: the store contract has no "must exist"
    /// expectation, so after the advisory check a wildcard write races a
    /// concurrent delete unconditionally and recreates the resource (a
    /// wildcard delete simply succeeds). Callers that need delete-vs-write
    /// exclusion must supply a concrete token.
    fn expected_version(&self, tag: &EntityTag, scope: &str) -> Result<Option<i64>, Outcome<M>> {
        match tag {
            EntityTag::Wildcard => Ok(None),
            EntityTag::Token(token) => match etag::decode(token, scope) {
                Some(version) => Ok(Some(version)),
                None => Err(Outcome::PreconditionFailed),
            },
        }
    }

    fn missing(&self, id: &str) -> Outcome<M> {
        tracing::debug!(id, "resource not found");
        Outcome::NotFound {
            gone: self.policy.is_gone_when_missing(),
        }
    }
}

/// A successful-looking store result without a version violates the store
/// contract.
fn versioned<M>(written: ModelVersion<M>, created: bool, id: Option<String>) -> Outcome<M> {
    if written.version().is_none() {
        return Outcome::InternalFault(
            "store returned an unversioned model after a successful write".to_string(),
        );
    }
    Outcome::Ok {
        value: written,
        created,
        id,
    }
}

fn fault<M>(operation: &str, error: StoreError) -> Outcome<M> {
    tracing::error!(operation, %error, "store operation failed");
    Outcome::InternalFault(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreResult};

    /// Store that breaks the contract by returning unversioned models from
    /// successful writes.
    struct UnversionedWriteStore;

    impl VersionedStore<String> for UnversionedWriteStore {
        async fn load(&self, _id: &str) -> StoreResult<Option<ModelVersion<String>>> {
            Ok(None)
        }

        async fn create(
            &self,
            _id: &str,
            model: String,
            _expected: Option<i64>,
        ) -> StoreResult<ModelVersion<String>> {
            Ok(ModelVersion::unversioned(model))
        }

        async fn compare_and_swap(
            &self,
            _id: &str,
            model: String,
            _expected: Option<i64>,
        ) -> StoreResult<ModelVersion<String>> {
            Ok(ModelVersion::unversioned(model))
        }

        async fn delete(&self, _id: &str, _expected: Option<i64>) -> StoreResult<()> {
            Ok(())
        }
    }

    /// Store where every advisory load is immediately followed by a
    /// concurrent delete, landing before the authoritative write.
    struct VanishingStore {
        inner: MemoryStore<String>,
    }

    impl VersionedStore<String> for VanishingStore {
        async fn load(&self, id: &str) -> StoreResult<Option<ModelVersion<String>>> {
            let current = self.inner.load(id).await?;
            let _ = self.inner.delete(id, None).await;
            Ok(current)
        }

        async fn create(
            &self,
            id: &str,
            model: String,
            expected: Option<i64>,
        ) -> StoreResult<ModelVersion<String>> {
            self.inner.create(id, model, expected).await
        }

        async fn compare_and_swap(
            &self,
            id: &str,
            model: String,
            expected: Option<i64>,
        ) -> StoreResult<ModelVersion<String>> {
            self.inner.compare_and_swap(id, model, expected).await
        }

        async fn delete(&self, id: &str, expected: Option<i64>) -> StoreResult<()> {
            self.inner.delete(id, expected).await
        }
    }

    fn handler() -> ResourceHandler<String, MemoryStore<String>> {
        ResourceHandler::new(MemoryStore::new(), ResourcePolicy::new("/note/v1"))
    }

    fn current_tag(handler: &ResourceHandler<String, MemoryStore<String>>, id: &str) -> EntityTag {
        let version = handler
            .store()
            .current_version(id)
            .unwrap()
            .expect("resource must exist");
        EntityTag::from_version(version, &handler.policy().scope_for(id))
    }

    #[tokio::test]
    async fn get_missing_resource_uses_policy_variant() {
        let transient = handler();
        assert_eq!(
            transient.get("nope", None).await,
            Outcome::NotFound { gone: false }
        );

        let gone = ResourceHandler::<String, _>::new(
            MemoryStore::<String>::new(),
            ResourcePolicy::new("/note/v1").gone_when_missing(true),
        );
        assert_eq!(gone.get("nope", None).await, Outcome::NotFound { gone: true });
    }

    #[tokio::test]
    async fn get_with_matching_if_none_match_is_not_modified() {
        let handler = handler();
        handler.put("a", "text".to_string(), None).await;
        let tag = current_tag(&handler, "a");
        assert_eq!(handler.get("a", Some(&tag)).await, Outcome::NotModified);
    }

    #[tokio::test]
    async fn get_with_stale_if_none_match_serves_fresh() {
        let handler = handler();
        handler.put("a", "v1".to_string(), None).await;
        let stale = current_tag(&handler, "a");
        handler.put("a", "v2".to_string(), None).await;
        match handler.get("a", Some(&stale)).await {
            Outcome::Ok { value, created, .. } => {
                assert_eq!(value.model(), "v2");
                assert!(!created);
            }
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unconditional_put_creates() {
        let handler = handler();
        match handler.put("new", "body".to_string(), None).await {
            Outcome::Ok { value, created, id } => {
                assert!(created);
                assert_eq!(id, None);
                assert_eq!(value.version(), Some(1));
            }
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn conditional_put_with_current_tag_updates() {
        let handler = handler();
        handler.put("a", "v1".to_string(), None).await;
        let tag = current_tag(&handler, "a");
        match handler.put("a", "v2".to_string(), Some(&tag)).await {
            Outcome::Ok { value, created, .. } => {
                assert!(!created);
                assert_eq!(value.version(), Some(2));
            }
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stale_put_fails_precondition_and_leaves_store_unchanged() {
        let handler = handler();
        handler.put("a", "v1".to_string(), None).await;
        let stale = current_tag(&handler, "a");
        handler.put("a", "v2".to_string(), None).await;

        let outcome = handler.put("a", "v3".to_string(), Some(&stale)).await;
        assert_eq!(outcome, Outcome::PreconditionFailed);

        match handler.get("a", None).await {
            Outcome::Ok { value, .. } => {
                assert_eq!(value.model(), "v2");
                assert_eq!(value.version(), Some(2));
            }
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn put_with_wildcard_requires_existence() {
        let handler = handler();
        let wildcard = EntityTag::Wildcard;
        assert_eq!(
            handler.put("absent", "x".to_string(), Some(&wildcard)).await,
            Outcome::PreconditionFailed
        );

        handler.put("present", "v1".to_string(), None).await;
        match handler.put("present", "v2".to_string(), Some(&wildcard)).await {
            Outcome::Ok { value, .. } => assert_eq!(value.version(), Some(2)),
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn put_with_malformed_token_fails_precondition() {
        let handler = handler();
        handler.put("a", "v1".to_string(), None).await;
        let malformed = EntityTag::Token("!!not-a-token!!".to_string());
        assert_eq!(
            handler.put("a", "v2".to_string(), Some(&malformed)).await,
            Outcome::PreconditionFailed
        );
    }

    #[tokio::test]
    async fn put_with_token_from_another_resource_fails_precondition() {
        let handler = handler();
        handler.put("a", "v1".to_string(), None).await;
        handler.put("b", "v1".to_string(), None).await;
        let foreign = current_tag(&handler, "b");
        assert_eq!(
            handler.put("a", "v2".to_string(), Some(&foreign)).await,
            Outcome::PreconditionFailed
        );
    }

    #[tokio::test]
    async fn post_creates_with_generated_id() {
        let handler = handler();
        match handler.post("body".to_string(), None).await {
            Outcome::Ok { value, created, id } => {
                assert!(created);
                assert_eq!(value.version(), Some(1));
                let id = id.expect("post must expose the generated id");
                assert_eq!(
                    handler.store().current_version(&id).unwrap(),
                    Some(1)
                );
            }
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unconditional_delete_is_idempotent() {
        let handler = handler();
        handler.put("a", "v1".to_string(), None).await;
        assert_eq!(handler.delete("a", None).await, Outcome::Deleted);
        assert_eq!(handler.delete("a", None).await, Outcome::Deleted);
    }

    #[tokio::test]
    async fn conditional_delete_then_get_is_not_found() {
        let handler = handler();
        handler.put("a", "v1".to_string(), None).await;
        let tag = current_tag(&handler, "a");
        assert_eq!(handler.delete("a", Some(&tag)).await, Outcome::Deleted);
        assert_eq!(
            handler.get("a", None).await,
            Outcome::NotFound { gone: false }
        );
    }

    #[tokio::test]
    async fn conditional_delete_with_stale_tag_fails() {
        let handler = handler();
        handler.put("a", "v1".to_string(), None).await;
        let stale = current_tag(&handler, "a");
        handler.put("a", "v2".to_string(), None).await;
        assert_eq!(
            handler.delete("a", Some(&stale)).await,
            Outcome::PreconditionFailed
        );
        assert!(matches!(handler.get("a", None).await, Outcome::Ok { .. }));
    }

    #[tokio::test]
    async fn unversioned_store_write_is_an_internal_fault() {
        let handler = ResourceHandler::new(UnversionedWriteStore, ResourcePolicy::new("/note/v1"));
        assert!(matches!(
            handler.put("a", "x".to_string(), None).await,
            Outcome::InternalFault(_)
        ));
        assert!(matches!(
            handler.post("x".to_string(), None).await,
            Outcome::InternalFault(_)
        ));
    }

    #[tokio::test]
    async fn head_does_not_require_get_in_the_policy() {
        let head_only = ResourceHandler::new(
            MemoryStore::<String>::new(),
            ResourcePolicy::new("/note/v1")
                .allowed_methods([Method::HEAD, Method::PUT, Method::OPTIONS]),
        );
        head_only.put("a", "x".to_string(), None).await;
        assert!(matches!(head_only.head("a", None).await, Outcome::Ok { .. }));
        assert_eq!(
            head_only.get("a", None).await,
            Outcome::UnsupportedOperation
        );
    }

    #[tokio::test]
    async fn wildcard_put_racing_a_delete_recreates_the_resource() {
        let store = VanishingStore {
            inner: MemoryStore::new(),
        };
        store.inner.seed("a", "v1".to_string(), 3).unwrap();
        let handler = ResourceHandler::new(store, ResourcePolicy::new("/note/v1"));

        // Wildcard decodes to an unconditional write, so the resource comes
        // back at version 1 instead of the precondition failing.
        match handler.put("a", "v2".to_string(), Some(&EntityTag::Wildcard)).await {
            Outcome::Ok { value, created, .. } => {
                assert!(!created);
                assert_eq!(value.version(), Some(1));
            }
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn concrete_token_put_racing_a_delete_fails_precondition() {
        let store = VanishingStore {
            inner: MemoryStore::new(),
        };
        store.inner.seed("a", "v1".to_string(), 3).unwrap();
        let handler = ResourceHandler::new(store, ResourcePolicy::new("/note/v1"));

        let tag = EntityTag::from_version(3, &handler.policy().scope_for("a"));
        assert_eq!(
            handler.put("a", "v2".to_string(), Some(&tag)).await,
            Outcome::PreconditionFailed
        );
    }

    #[tokio::test]
    async fn disallowed_verbs_map_to_unsupported_operation() {
        let readonly = ResourceHandler::<String, _>::new(
            MemoryStore::<String>::new(),
            ResourcePolicy::new("/note/v1").allowed_methods([Method::GET, Method::OPTIONS]),
        );
        assert_eq!(
            readonly.put("a", "x".to_string(), None).await,
            Outcome::UnsupportedOperation
        );
        assert_eq!(
            readonly.delete("a", None).await,
            Outcome::UnsupportedOperation
        );
        assert_eq!(readonly.patch(), Outcome::UnsupportedOperation);
    }
}
