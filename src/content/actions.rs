use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::kind::{ContentKind, ContentSpec, KeyStyle};
use super::validate::{slugify, validate_fields, Mode};
use super::ContentError;
use crate::auth::{AuthorizationGuard, Principal, SessionPrincipal};
use crate::filter::FilterData;
use crate::revalidate::{InvalidationTarget, Revalidator};
use crate::store::{timestamp_now, ContentStore, RecordKey, Row};

/// Which rows a listing may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView {
    /// Published rows only, in public order.
    Public,
    /// Every row, in admin order.
    Admin,
}

/// The generic CRUD contract every content type follows: authorize, validate, one store
/// statement, then invalidate the pages that render the type.
#[derive(Clone)]
pub struct ContentActions {
    store: Arc<dyn ContentStore>,
    guard: AuthorizationGuard,
    revalidator: Arc<dyn Revalidator>,
}

impl ContentActions {
    pub fn new(store: Arc<dyn ContentStore>, revalidator: Arc<dyn Revalidator>) -> Self {
        let guard = AuthorizationGuard::new(store.clone());
        Self { store, guard, revalidator }
    }

    pub fn guard(&self) -> &AuthorizationGuard {
        &self.guard
    }

    /// Lists rows of `kind`. A store failure degrades to an empty list.
    pub async fn list(
        &self,
        kind: ContentKind,
        view: ListView,
        filters: &BTreeMap<String, String>,
    ) -> Result<Vec<Row>, ContentError> {
        let spec = kind.spec();
        let mut filter = FilterData::new();

        let mut unknown = BTreeMap::new();
        for (column, value) in filters {
            if spec.filterable.contains(&column.as_str()) {
                filter = filter.eq(column.clone(), value.clone());
            } else {
                unknown.insert(column.clone(), format!("Cannot filter {} by {}", spec.route, column));
            }
        }
        if !unknown.is_empty() {
            return Err(ContentError::fields(unknown));
        }

        if view == ListView::Public {
            if let Some(flag) = spec.publication {
                filter = filter.eq(flag, true);
            }
        }
        let filter = filter.ordered(&spec.order_for(view == ListView::Public));

        match self.store.select(spec.table, &filter).await {
            Ok(rows) => Ok(rows),
            Err(err) => {
                tracing::warn!("listing {} failed, returning no rows: {}", spec.route, err);
                Ok(Vec::new())
            }
        }
    }

    /// Looks up one row by its stable key. Absence is `Ok(None)`.
    pub async fn get_one(&self, kind: ContentKind, key: &str) -> Result<Option<Row>, ContentError> {
        let spec = kind.spec();
        let filter = FilterData::new().eq(spec.key_column(), key).limit(1);
        let rows = self.store.select(spec.table, &filter).await.map_err(|err| {
            tracing::error!("loading {} {} failed: {}", spec.route, key, err);
            ContentError::StoreUnavailable(err.to_string())
        })?;
        Ok(rows.into_iter().next())
    }

    /// Public single-entity lookup by route key (slug, natural key or id). Unpublished rows and
    /// store failures both read as absent.
    pub async fn find_published(&self, kind: ContentKind, route_key: &str) -> Option<Row> {
        let spec = kind.spec();
        let column = if spec.slug { "slug" } else { spec.key_column() };
        let mut filter = FilterData::new().eq(column, route_key);
        if let Some(flag) = spec.publication {
            filter = filter.eq(flag, true);
        }

        match self.store.select(spec.table, &filter.limit(1)).await {
            Ok(rows) => rows.into_iter().next(),
            Err(err) => {
                tracing::warn!("public lookup of {} {} failed: {}", spec.route, route_key, err);
                None
            }
        }
    }

    pub async fn create(
        &self,
        session: Option<&SessionPrincipal>,
        kind: ContentKind,
        input: Row,
    ) -> Result<Row, ContentError> {
        let spec = kind.spec();
        let principal = self.guard.authorize(session, spec.policy).await?;
        let mut row = validate_fields(spec, &input, Mode::Create)?;

        if spec.slug {
            let slug = match row.get("slug").and_then(Value::as_str) {
                Some(slug) if !slug.is_empty() => slug.to_string(),
                _ => {
                    let title = row.get("title").and_then(Value::as_str).unwrap_or_default();
                    slugify(title)
                }
            };
            if slug.is_empty() {
                return Err(ContentError::field("slug", "Could not derive a slug from the title"));
            }
            self.ensure_slug_free(spec, &slug, None).await?;
            row.insert("slug".to_string(), Value::String(slug));
        }

        if let Some(flag) = spec.publication {
            if !matches!(row.get(flag), Some(Value::Bool(_))) {
                row.insert(flag.to_string(), Value::Bool(false));
            }
        }

        if let Some(auto) = spec.auto_order {
            if row.get(auto.column).map(Value::is_null).unwrap_or(true) {
                let next = self.next_order(spec, &row).await?;
                row.insert(auto.column.to_string(), Value::from(next));
            }
        }

        stamp(&mut row, &principal, true);
        let created = self.store.insert(spec.table, row).await.map_err(|err| {
            tracing::error!("creating {} failed: {}", spec.route, err);
            ContentError::from_store(err)
        })?;

        tracing::info!("{} created {} {}", principal.email, spec.route, display_key(spec, &created));
        self.invalidate(spec, Some(&created)).await;
        Ok(created)
    }

    /// Partial update. Natural-key types upsert, so the first edit of an unseeded key creates it.
    pub async fn update(
        &self,
        session: Option<&SessionPrincipal>,
        kind: ContentKind,
        key: &str,
        input: Row,
    ) -> Result<Row, ContentError> {
        let spec = kind.spec();
        let principal = self.guard.authorize(session, spec.policy).await?;
        let mut patch = validate_fields(spec, &input, Mode::Patch)?;

        if let KeyStyle::Natural(column) = spec.key {
            match patch.remove(column) {
                Some(Value::String(value)) if value == key => {}
                Some(_) => return Err(ContentError::field(column, "Key cannot be changed")),
                None => {}
            }
        }

        let mut previous_slug = None;
        if spec.slug {
            if let Some(Value::String(slug)) = patch.get("slug") {
                self.ensure_slug_free(spec, slug, Some(key)).await?;
                previous_slug = self
                    .get_one(kind, key)
                    .await?
                    .and_then(|current| current.get("slug").and_then(Value::as_str).map(str::to_string))
                    .filter(|old| old != slug);
            }
        }

        stamp(&mut patch, &principal, false);
        if let KeyStyle::Natural(_) = spec.key {
            // Kept by the store when the row already exists.
            patch.insert("created_by".to_string(), Value::String(principal.id.to_string()));
        }
        let record_key = RecordKey::new(spec.key_column(), key);
        let result = match spec.key {
            KeyStyle::Id => self.store.update(spec.table, &record_key, patch).await,
            KeyStyle::Natural(_) => self.store.upsert(spec.table, &record_key, patch).await.map(Some),
        };

        let updated = result
            .map_err(|err| {
                tracing::error!("updating {} {} failed: {}", spec.route, key, err);
                ContentError::from_store(err)
            })?
            .ok_or_else(|| not_found(spec, key))?;

        tracing::info!("{} updated {} {}", principal.email, spec.route, key);
        self.invalidate_renamed(spec, &updated, previous_slug.as_deref()).await;
        Ok(updated)
    }

    /// Hard delete. Deleting a missing key succeeds.
    pub async fn delete(
        &self,
        session: Option<&SessionPrincipal>,
        kind: ContentKind,
        key: &str,
    ) -> Result<(), ContentError> {
        let spec = kind.spec();
        let principal = self.guard.authorize(session, spec.policy).await?;

        let removed = self
            .store
            .delete(spec.table, &RecordKey::new(spec.key_column(), key))
            .await
            .map_err(|err| {
                tracing::error!("deleting {} {} failed: {}", spec.route, key, err);
                ContentError::from_store(err)
            })?;

        match &removed {
            Some(_) => tracing::info!("{} deleted {} {}", principal.email, spec.route, key),
            None => tracing::debug!("{} {} already absent", spec.route, key),
        }
        self.invalidate(spec, removed.as_ref()).await;
        Ok(())
    }

    pub async fn publish(
        &self,
        session: Option<&SessionPrincipal>,
        kind: ContentKind,
        key: &str,
    ) -> Result<Row, ContentError> {
        self.set_published(session, kind, key, true).await
    }

    pub async fn unpublish(
        &self,
        session: Option<&SessionPrincipal>,
        kind: ContentKind,
        key: &str,
    ) -> Result<Row, ContentError> {
        self.set_published(session, kind, key, false).await
    }

    async fn set_published(
        &self,
        session: Option<&SessionPrincipal>,
        kind: ContentKind,
        key: &str,
        published: bool,
    ) -> Result<Row, ContentError> {
        let spec = kind.spec();
        let flag = spec
            .publication
            .ok_or_else(|| ContentError::Unsupported(format!("{} has no publication state", spec.route)))?;
        let principal = self.guard.authorize(session, spec.policy).await?;

        let mut patch = Row::new();
        patch.insert(flag.to_string(), Value::Bool(published));

        if published && spec.field("published_at").is_some() {
            let current = self.get_one(kind, key).await?.ok_or_else(|| not_found(spec, key))?;
            if current.get("published_at").map(Value::is_null).unwrap_or(true) {
                patch.insert("published_at".to_string(), Value::String(timestamp_now()));
            }
        }

        stamp(&mut patch, &principal, false);
        let updated = self
            .store
            .update(spec.table, &RecordKey::new(spec.key_column(), key), patch)
            .await
            .map_err(|err| {
                tracing::error!("toggling {} {} failed: {}", spec.route, key, err);
                ContentError::from_store(err)
            })?
            .ok_or_else(|| not_found(spec, key))?;

        tracing::info!(
            "{} {} {} {}",
            principal.email,
            if published { "published" } else { "unpublished" },
            spec.route,
            key
        );
        self.invalidate(spec, Some(&updated)).await;
        Ok(updated)
    }

    async fn ensure_slug_free(&self, spec: &ContentSpec, slug: &str, own_key: Option<&str>) -> Result<(), ContentError> {
        let mut filter = FilterData::new().eq("slug", slug);
        if let Some(key) = own_key {
            filter = filter.neq(spec.key_column(), key);
        }
        let clashes = self
            .store
            .select(spec.table, &filter.limit(1))
            .await
            .map_err(ContentError::from_store)?;
        if clashes.is_empty() {
            Ok(())
        } else {
            Err(ContentError::field("slug", format!("Slug \"{}\" is already in use", slug)))
        }
    }

    /// `max + 1` over the ordering column, within the scope value when the type has one.
    /// Read-then-write: two concurrent creates may receive the same value.
    async fn next_order(&self, spec: &ContentSpec, row: &Row) -> Result<i64, ContentError> {
        let Some(auto) = spec.auto_order else { return Ok(1) };
        let mut filter = FilterData::new();
        if let Some(scope) = auto.scope {
            filter = filter.eq(scope, row.get(scope).cloned().unwrap_or(Value::Null));
        }
        let rows = self
            .store
            .select(spec.table, &filter)
            .await
            .map_err(ContentError::from_store)?;
        let max = rows
            .iter()
            .filter_map(|r| r.get(auto.column).and_then(Value::as_i64))
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn invalidate(&self, spec: &ContentSpec, row: Option<&Row>) {
        let slug = row.and_then(|r| r.get("slug")).and_then(Value::as_str);
        self.revalidate(spec, slug.into_iter().collect()).await;
    }

    /// A slug change leaves the old detail page cached unless it is
    /// invalidated alongside the new one.
    async fn invalidate_renamed(&self, spec: &ContentSpec, row: &Row, previous_slug: Option<&str>) {
        let slug = row.get("slug").and_then(Value::as_str);
        self.revalidate(spec, slug.into_iter().chain(previous_slug).collect()).await;
    }

    async fn revalidate(&self, spec: &ContentSpec, slugs: Vec<&str>) {
        let mut targets: Vec<InvalidationTarget> = Vec::new();
        for route in spec.public_routes {
            let paths: Vec<String> = if route.contains("{slug}") {
                slugs.iter().map(|slug| route.replace("{slug}", slug)).collect()
            } else {
                vec![route.to_string()]
            };
            targets.extend(paths.into_iter().map(|path| {
                if spec.layout {
                    InvalidationTarget::layout(path)
                } else {
                    InvalidationTarget::page(path)
                }
            }));
        }
        targets.push(InvalidationTarget::page(spec.admin_route()));

        if let Err(err) = self.revalidator.invalidate(&targets).await {
            tracing::warn!("revalidation after {} change failed: {}", spec.route, err);
        }
    }
}

fn stamp(row: &mut Row, principal: &Principal, created: bool) {
    let actor = Value::String(principal.id.to_string());
    if created {
        row.insert("created_by".to_string(), actor.clone());
    } else {
        row.insert("updated_at".to_string(), Value::String(timestamp_now()));
    }
    row.insert("updated_by".to_string(), actor);
}

fn not_found(spec: &ContentSpec, key: &str) -> ContentError {
    ContentError::NotFound(format!("No {} record with key {}", spec.route, key))
}

fn display_key(spec: &ContentSpec, row: &Row) -> String {
    row.get(spec.key_column())
        .and_then(crate::filter::filter_where::value_as_text)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::revalidate::RecordingRevalidator;
    use crate::store::MemoryStore;
    use serde_json::json;
    use uuid::Uuid;

    struct Fixture {
        actions: ContentActions,
        store: Arc<MemoryStore>,
        revalidator: Arc<RecordingRevalidator>,
        admin: SessionPrincipal,
        editor: SessionPrincipal,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let revalidator = Arc::new(RecordingRevalidator::new());
        let admin = SessionPrincipal { id: Uuid::new_v4(), email: "root@example.com".into() };
        let editor = SessionPrincipal { id: Uuid::new_v4(), email: "editor@example.com".into() };
        store.add_principal(admin.id, admin.email.clone(), Some(Role::SuperAdmin)).await;
        store.add_principal(editor.id, editor.email.clone(), Some(Role::CompanyAdmin)).await;
        let actions = ContentActions::new(store.clone(), revalidator.clone());
        Fixture { actions, store, revalidator, admin, editor }
    }

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn no_filters() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[tokio::test]
    async fn unpublished_rows_stay_private_until_published() {
        let f = fixture().await;
        let created = f
            .actions
            .create(Some(&f.admin), ContentKind::Services, row(json!({ "title": "Red Team Operations" })))
            .await
            .unwrap();
        assert_eq!(created["slug"], json!("red-team-operations"));
        assert_eq!(created["is_published"], json!(false));

        let public = f.actions.list(ContentKind::Services, ListView::Public, &no_filters()).await.unwrap();
        assert!(public.is_empty());
        assert!(f.actions.find_published(ContentKind::Services, "red-team-operations").await.is_none());

        let id = created["id"].as_str().unwrap();
        f.actions.publish(Some(&f.admin), ContentKind::Services, id).await.unwrap();
        let public = f.actions.list(ContentKind::Services, ListView::Public, &no_filters()).await.unwrap();
        assert_eq!(public.len(), 1);
        assert!(f.actions.find_published(ContentKind::Services, "red-team-operations").await.is_some());
    }

    #[tokio::test]
    async fn rejected_mutations_never_reach_content_tables() {
        let f = fixture().await;
        let input = row(json!({ "question": "Q?", "answer": "A." }));
        assert!(matches!(
            f.actions.create(None, ContentKind::Faqs, input.clone()).await,
            Err(ContentError::Unauthorized(_))
        ));
        assert!(matches!(
            f.actions.create(Some(&f.editor), ContentKind::Faqs, input).await,
            Err(ContentError::Unauthorized(_))
        ));
        assert!(matches!(
            f.actions.delete(Some(&f.editor), ContentKind::Settings, "site_name").await,
            Err(ContentError::Unauthorized(_))
        ));
        assert!(matches!(
            f.actions.publish(None, ContentKind::Resources, "x").await,
            Err(ContentError::Unauthorized(_))
        ));
        assert_eq!(f.store.content_calls(), 0);
        assert!(f.revalidator.batches().is_empty());
    }

    #[tokio::test]
    async fn any_signed_in_principal_may_write_resources() {
        let f = fixture().await;
        let outsider = SessionPrincipal { id: Uuid::new_v4(), email: "someone@example.com".into() };
        let created = f
            .actions
            .create(Some(&outsider), ContentKind::Resources, row(json!({ "title": "Threat Report 2024" })))
            .await
            .unwrap();
        assert_eq!(created["created_by"], json!(outsider.id.to_string()));
    }

    #[tokio::test]
    async fn empty_update_only_touches_audit_columns() {
        let f = fixture().await;
        let created = f
            .actions
            .create(Some(&f.admin), ContentKind::Faqs, row(json!({ "question": "Q?", "answer": "A." })))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap();
        let updated = f.actions.update(Some(&f.admin), ContentKind::Faqs, id, Row::new()).await.unwrap();

        for (column, value) in &created {
            if column != "updated_at" && column != "updated_by" {
                assert_eq!(updated.get(column), Some(value), "{} changed", column);
            }
        }
        assert!(updated["updated_at"].as_str().unwrap() >= created["updated_at"].as_str().unwrap());
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found() {
        let f = fixture().await;
        let missing = Uuid::new_v4().to_string();
        assert!(matches!(
            f.actions.update(Some(&f.admin), ContentKind::Faqs, &missing, Row::new()).await,
            Err(ContentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let f = fixture().await;
        let missing = Uuid::new_v4().to_string();
        f.actions.delete(Some(&f.admin), ContentKind::TeamMembers, &missing).await.unwrap();
        assert!(f.actions.get_one(ContentKind::TeamMembers, &missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn updating_unseeded_section_creates_it() {
        let f = fixture().await;
        let updated = f
            .actions
            .update(Some(&f.admin), ContentKind::About, "mission", row(json!({ "title": "Our mission" })))
            .await
            .unwrap();
        assert_eq!(updated["section_key"], json!("mission"));
        let stored = f.actions.get_one(ContentKind::About, "mission").await.unwrap().unwrap();
        assert_eq!(stored["title"], json!("Our mission"));
    }

    #[tokio::test]
    async fn natural_key_cannot_be_renamed_through_update() {
        let f = fixture().await;
        let err = f
            .actions
            .update(Some(&f.admin), ContentKind::Settings, "site_name", row(json!({ "key": "tagline" })))
            .await
            .unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("key"));
    }

    #[tokio::test]
    async fn display_order_is_scoped_per_product() {
        let f = fixture().await;
        let mut orders = Vec::new();
        for product in ["argus", "argus", "sentry"] {
            let created = f
                .actions
                .create(
                    Some(&f.admin),
                    ContentKind::ProductFeatures,
                    row(json!({ "product": product, "title": "Feature" })),
                )
                .await
                .unwrap();
            orders.push(created["display_order"].clone());
        }
        assert_eq!(orders, vec![json!(1), json!(2), json!(1)]);

        let filters = BTreeMap::from([("product".to_string(), "argus".to_string())]);
        let argus = f.actions.list(ContentKind::ProductFeatures, ListView::Public, &filters).await.unwrap();
        assert_eq!(argus.len(), 2);
    }

    #[tokio::test]
    async fn unknown_filters_are_rejected() {
        let f = fixture().await;
        let filters = BTreeMap::from([("secret".to_string(), "x".to_string())]);
        assert!(matches!(
            f.actions.list(ContentKind::Faqs, ListView::Public, &filters).await,
            Err(ContentError::ValidationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_field_error() {
        let f = fixture().await;
        let input = row(json!({ "title": "Digital Forensics" }));
        f.actions.create(Some(&f.admin), ContentKind::Services, input.clone()).await.unwrap();
        let err = f.actions.create(Some(&f.admin), ContentKind::Services, input).await.unwrap_err();
        assert!(err.field_errors().unwrap()["slug"].contains("already in use"));
    }

    #[tokio::test]
    async fn publish_is_unsupported_without_a_flag() {
        let f = fixture().await;
        assert!(matches!(
            f.actions.publish(Some(&f.admin), ContentKind::TeamMembers, "x").await,
            Err(ContentError::Unsupported(_))
        ));
        assert_eq!(f.store.content_calls(), 0);
    }

    #[tokio::test]
    async fn first_publish_stamps_published_at() {
        let f = fixture().await;
        let created = f
            .actions
            .create(Some(&f.admin), ContentKind::Resources, row(json!({ "title": "Brief" })))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap();
        let published = f.actions.publish(Some(&f.admin), ContentKind::Resources, id).await.unwrap();
        let stamp = published["published_at"].clone();
        assert!(stamp.is_string());

        f.actions.unpublish(Some(&f.admin), ContentKind::Resources, id).await.unwrap();
        let again = f.actions.publish(Some(&f.admin), ContentKind::Resources, id).await.unwrap();
        assert_eq!(again["published_at"], stamp);
    }

    #[tokio::test]
    async fn mutations_invalidate_public_and_admin_routes() {
        let f = fixture().await;
        let created = f
            .actions
            .create(Some(&f.admin), ContentKind::Solutions, row(json!({ "title": "Maritime Security" })))
            .await
            .unwrap();
        assert_eq!(
            f.revalidator.paths(),
            vec!["/", "/solutions", "/solutions/maritime-security", "/admin/solutions"]
        );
        assert_eq!(created["is_published"], json!(false));

        f.actions
            .update(Some(&f.admin), ContentKind::Settings, "site_name", row(json!({ "value": "Acme" })))
            .await
            .unwrap();
        let last = f.revalidator.batches().pop().unwrap();
        assert!(last[0].layout);
        assert_eq!(last[1].path, "/admin/settings");
    }

    #[tokio::test]
    async fn slug_rename_invalidates_old_and_new_detail_pages() {
        let f = fixture().await;
        let created = f
            .actions
            .create(Some(&f.admin), ContentKind::Services, row(json!({ "title": "Offensive Security" })))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap();

        f.actions
            .update(Some(&f.admin), ContentKind::Services, id, row(json!({ "slug": "red-team" })))
            .await
            .unwrap();
        let last: Vec<String> = f.revalidator.batches().pop().unwrap().into_iter().map(|t| t.path).collect();
        assert!(last.contains(&"/services/red-team".to_string()));
        assert!(last.contains(&"/services/offensive-security".to_string()));

        f.actions
            .update(Some(&f.admin), ContentKind::Services, id, row(json!({ "short_description": "Adversary emulation" })))
            .await
            .unwrap();
        let last: Vec<String> = f.revalidator.batches().pop().unwrap().into_iter().map(|t| t.path).collect();
        assert_eq!(last, vec!["/", "/services", "/services/red-team", "/admin/services"]);
    }

    #[tokio::test]
    async fn blank_slug_update_is_rejected_before_the_store() {
        let f = fixture().await;
        let created = f
            .actions
            .create(Some(&f.admin), ContentKind::Services, row(json!({ "title": "Red Team" })))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap();
        let batches = f.revalidator.batches().len();

        for slug in [json!(""), Value::Null] {
            let result = f
                .actions
                .update(Some(&f.admin), ContentKind::Services, id, row(json!({ "slug": slug })))
                .await;
            match result {
                Err(err) => assert_eq!(err.field_errors().unwrap()["slug"], "Slug cannot be empty"),
                Ok(row) => panic!("blank slug accepted: {:?}", row),
            }
        }
        let stored = f.actions.get_one(ContentKind::Services, id).await.unwrap().unwrap();
        assert_eq!(stored["slug"], json!("red-team"));
        assert_eq!(f.revalidator.batches().len(), batches);
    }

    #[tokio::test]
    async fn natural_key_upsert_records_creator_once() {
        let f = fixture().await;
        let first = f
            .actions
            .update(Some(&f.admin), ContentKind::Settings, "site_name", row(json!({ "value": "Acme" })))
            .await
            .unwrap();
        assert_eq!(first["created_by"], json!(f.admin.id.to_string()));

        let other = SessionPrincipal { id: Uuid::new_v4(), email: "ops@example.com".into() };
        f.store.add_principal(other.id, other.email.clone(), Some(Role::SuperAdmin)).await;
        let second = f
            .actions
            .update(Some(&other), ContentKind::Settings, "site_name", row(json!({ "value": "Acme Ltd" })))
            .await
            .unwrap();
        assert_eq!(second["value"], json!("Acme Ltd"));
        assert_eq!(second["created_by"], json!(f.admin.id.to_string()));
        assert_eq!(second["updated_by"], json!(other.id.to_string()));
    }

    #[tokio::test]
    async fn failed_revalidation_does_not_fail_the_mutation() {
        let f = fixture().await;
        f.revalidator.set_failing(true);
        let created = f
            .actions
            .create(Some(&f.admin), ContentKind::HomepageSteps, row(json!({ "title": "Assess" })))
            .await;
        assert!(created.is_ok());
    }

    #[tokio::test]
    async fn read_paths_degrade_when_store_is_down() {
        let f = fixture().await;
        f.store.set_unavailable(true);
        assert!(f.actions.list(ContentKind::Faqs, ListView::Public, &no_filters()).await.unwrap().is_empty());
        assert!(f.actions.find_published(ContentKind::Services, "x").await.is_none());
        assert!(matches!(
            f.actions.get_one(ContentKind::Faqs, "x").await,
            Err(ContentError::StoreUnavailable(_))
        ));
    }
}
