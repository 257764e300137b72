//! Property repository: reads go straight to the database, writes are staged
//! and committed together by [`PropertyRepository::save`].

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use domain::models::{Property, Tenant};
use shared::ids;

use crate::entities::{PropertyEntity, TenantEntity};
use crate::metrics::{record_saved_changes, QueryTimer};

/// A write waiting for the next save.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedChange {
    /// Insert the property together with its nested tenants.
    InsertProperty(Property),
    UpdateProperty(Property),
    DeleteProperty(Uuid),
    InsertTenant(Tenant),
    UpdateTenant(Tenant),
    DeleteTenant(Uuid),
}

/// Ordered list of staged writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<StagedChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> &[StagedChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Removes and returns every staged change, leaving the set empty.
    pub fn take(&mut self) -> Vec<StagedChange> {
        std::mem::take(&mut self.changes)
    }

    /// Assigns a fresh id to the property (always) and to every nested tenant
    /// without one, points the tenants at the property and stages the insert.
    pub fn add_property(&mut self, property: &mut Property) {
        property.id = ids::new_id();
        for tenant in &mut property.tenants {
            ids::assign_if_missing(&mut tenant.id);
            tenant.property_id = property.id;
        }
        self.changes
            .push(StagedChange::InsertProperty(property.clone()));
    }

    pub fn update_property(&mut self, property: &Property) {
        self.changes
            .push(StagedChange::UpdateProperty(property.clone()));
    }

    pub fn delete_property(&mut self, property: &Property) {
        self.changes.push(StagedChange::DeleteProperty(property.id));
    }

    /// Stages a new tenant under `property_id`, assigning an id if it has none.
    pub fn add_tenant(&mut self, property_id: Uuid, tenant: &mut Tenant) {
        ids::assign_if_missing(&mut tenant.id);
        tenant.property_id = property_id;
        self.changes.push(StagedChange::InsertTenant(tenant.clone()));
    }

    pub fn update_tenant(&mut self, tenant: &Tenant) {
        self.changes.push(StagedChange::UpdateTenant(tenant.clone()));
    }

    pub fn delete_tenant(&mut self, tenant: &Tenant) {
        self.changes.push(StagedChange::DeleteTenant(tenant.id));
    }
}

/// Repository for properties and their tenants.
///
/// One instance serves one unit of work: create it per request from the shared
/// pool, stage changes, then call [`save`](Self::save).
pub struct PropertyRepository {
    pool: PgPool,
    staged: ChangeSet,
}

impl PropertyRepository {
    /// Creates a new PropertyRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            staged: ChangeSet::new(),
        }
    }

    /// Changes staged since the last save.
    pub fn staged(&self) -> &ChangeSet {
        &self.staged
    }

    /// All properties, cheapest market value first, with their tenants.
    pub async fn list_properties(&self) -> Result<Vec<Property>, sqlx::Error> {
        let timer = QueryTimer::new("list_properties");
        let properties = sqlx::query_as::<_, PropertyEntity>(
            r#"
            SELECT * FROM properties
            ORDER BY market_value ASC, created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let tenants = sqlx::query_as::<_, TenantEntity>(
            r#"
            SELECT * FROM tenants
            ORDER BY first_name ASC, last_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        let mut by_property: HashMap<Uuid, Vec<Tenant>> = HashMap::new();
        for tenant in tenants {
            by_property
                .entry(tenant.property_id)
                .or_default()
                .push(tenant.into());
        }

        Ok(properties
            .into_iter()
            .map(|p| {
                let tenants = by_property.remove(&p.id).unwrap_or_default();
                p.into_domain(tenants)
            })
            .collect())
    }

    /// Find a property by id, with its tenants.
    pub async fn get_property(&self, property_id: Uuid) -> Result<Option<Property>, sqlx::Error> {
        let timer = QueryTimer::new("find_property_by_id");
        let entity = sqlx::query_as::<_, PropertyEntity>(
            r#"
            SELECT * FROM properties WHERE id = $1
            "#,
        )
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        match entity? {
            Some(entity) => {
                let tenants = self.list_tenants_for_property(property_id).await?;
                Ok(Some(entity.into_domain(tenants)))
            }
            None => Ok(None),
        }
    }

    /// Check whether a property exists without loading it.
    pub async fn property_exists(&self, property_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("property_exists");
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(SELECT 1 FROM properties WHERE id = $1)
            "#,
        )
        .bind(property_id)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(exists.0)
    }

    /// Stage a new property (and its nested tenants) for insertion.
    pub fn add_property(&mut self, property: &mut Property) {
        self.staged.add_property(property);
    }

    /// Stage an already merged property for writing.
    pub fn update_property(&mut self, property: &Property) {
        self.staged.update_property(property);
    }

    /// Stage a property for removal; its tenants go with it.
    pub fn delete_property(&mut self, property: &Property) {
        self.staged.delete_property(property);
    }

    /// All tenants of a property ordered by first name.
    pub async fn list_tenants_for_property(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<Tenant>, sqlx::Error> {
        let timer = QueryTimer::new("list_tenants_for_property");
        let result = sqlx::query_as::<_, TenantEntity>(
            r#"
            SELECT * FROM tenants
            WHERE property_id = $1
            ORDER BY first_name ASC, last_name ASC
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result?.into_iter().map(Tenant::from).collect())
    }

    /// Find a tenant scoped by its property.
    pub async fn find_tenant(
        &self,
        property_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Tenant>, sqlx::Error> {
        let timer = QueryTimer::new("find_tenant");
        let result = sqlx::query_as::<_, TenantEntity>(
            r#"
            SELECT * FROM tenants WHERE id = $1 AND property_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.map(Tenant::from))
    }

    /// Stage a tenant under an existing property.
    ///
    /// Does nothing when the property does not exist; callers check existence
    /// first.
    pub async fn add_tenant_to_property(
        &mut self,
        property_id: Uuid,
        tenant: &mut Tenant,
    ) -> Result<(), sqlx::Error> {
        if self.property_exists(property_id).await? {
            self.staged.add_tenant(property_id, tenant);
        } else {
            debug!(property_id = %property_id, "Property missing, tenant not staged");
        }
        Ok(())
    }

    pub fn update_tenant(&mut self, tenant: &Tenant) {
        self.staged.update_tenant(tenant);
    }

    pub fn delete_tenant(&mut self, tenant: &Tenant) {
        self.staged.delete_tenant(tenant);
    }

    /// Commit every staged change in one transaction.
    ///
    /// Returns the number of rows affected. Any failing statement rolls the
    /// whole transaction back. The stage is cleared either way.
    pub async fn save(&mut self) -> Result<u64, sqlx::Error> {
        let changes = self.staged.take();
        if changes.is_empty() {
            return Ok(0);
        }

        let timer = QueryTimer::new("save_changes");
        let mut tx = self.pool.begin().await?;
        let mut rows_affected = 0;
        for change in &changes {
            rows_affected += apply_change(&mut tx, change).await?;
        }
        tx.commit().await?;
        timer.record();

        record_saved_changes(changes.len());
        debug!(
            changes = changes.len(),
            rows_affected = rows_affected,
            "Saved staged changes"
        );
        Ok(rows_affected)
    }
}

async fn apply_change(
    tx: &mut Transaction<'_, Postgres>,
    change: &StagedChange,
) -> Result<u64, sqlx::Error> {
    match change {
        StagedChange::InsertProperty(property) => insert_property(tx, property).await,
        StagedChange::UpdateProperty(property) => update_property_row(tx, property).await,
        StagedChange::DeleteProperty(id) => {
            let result = sqlx::query(
                r#"
                DELETE FROM properties WHERE id = $1
                "#,
            )
            .bind(id)
            .execute(&mut **tx)
            .await?;
            Ok(result.rows_affected())
        }
        StagedChange::InsertTenant(tenant) => insert_tenant(tx, tenant).await,
        StagedChange::UpdateTenant(tenant) => {
            let result = sqlx::query(
                r#"
                UPDATE tenants SET
                    first_name = $2,
                    last_name = $3,
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(tenant.id)
            .bind(&tenant.first_name)
            .bind(&tenant.last_name)
            .execute(&mut **tx)
            .await?;
            Ok(result.rows_affected())
        }
        StagedChange::DeleteTenant(id) => {
            let result = sqlx::query(
                r#"
                DELETE FROM tenants WHERE id = $1
                "#,
            )
            .bind(id)
            .execute(&mut **tx)
            .await?;
            Ok(result.rows_affected())
        }
    }
}

/// Insert a property row followed by its tenants.
pub(crate) async fn insert_property(
    tx: &mut Transaction<'_, Postgres>,
    property: &Property,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO properties (id, description, market_value, rent, costs, house_number,
                                street, post_code, country, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(property.id)
    .bind(&property.description)
    .bind(property.market_value)
    .bind(property.rent)
    .bind(property.costs)
    .bind(property.house_number)
    .bind(&property.street)
    .bind(&property.post_code)
    .bind(&property.country)
    .bind(property.created_at)
    .bind(property.updated_at)
    .execute(&mut **tx)
    .await?;

    let mut rows_affected = result.rows_affected();
    for tenant in &property.tenants {
        rows_affected += insert_tenant(tx, tenant).await?;
    }
    Ok(rows_affected)
}

async fn insert_tenant(
    tx: &mut Transaction<'_, Postgres>,
    tenant: &Tenant,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO tenants (id, property_id, first_name, last_name, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(tenant.id)
    .bind(tenant.property_id)
    .bind(&tenant.first_name)
    .bind(&tenant.last_name)
    .bind(tenant.created_at)
    .bind(tenant.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected())
}

async fn update_property_row(
    tx: &mut Transaction<'_, Postgres>,
    property: &Property,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE properties SET
            description = $2,
            market_value = $3,
            rent = $4,
            costs = $5,
            house_number = $6,
            street = $7,
            post_code = $8,
            country = $9,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(property.id)
    .bind(&property.description)
    .bind(property.market_value)
    .bind(property.rent)
    .bind(property.costs)
    .bind(property.house_number)
    .bind(&property.street)
    .bind(&property.post_code)
    .bind(&property.country)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::collections::HashSet;

    fn tenant(first: &str, last: &str) -> Tenant {
        Tenant {
            id: Uuid::nil(),
            property_id: Uuid::nil(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn unsaved_property(tenants: Vec<Tenant>) -> Property {
        Property {
            id: Uuid::nil(),
            description: Some("Cosy semi-detached house in central Mansfield.".to_string()),
            market_value: Decimal::from(95000),
            rent: Decimal::from(450),
            costs: Decimal::from(100),
            house_number: 12,
            street: "Newcastle Street".to_string(),
            post_code: "S70 2FF".to_string(),
            country: "United Kingdom".to_string(),
            tenants,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_property_assigns_fresh_ids() {
        let mut changes = ChangeSet::new();
        let mut property = unsaved_property(vec![tenant("Some", "Dude"), tenant("Other", "Dude")]);

        changes.add_property(&mut property);

        assert!(!property.id.is_nil());
        for t in &property.tenants {
            assert!(!t.id.is_nil());
            assert_eq!(t.property_id, property.id);
        }
        assert_ne!(property.tenants[0].id, property.tenants[1].id);
        assert_eq!(
            changes.changes(),
            &[StagedChange::InsertProperty(property.clone())]
        );
    }

    #[test]
    fn test_add_property_replaces_supplied_property_id() {
        let mut changes = ChangeSet::new();
        let supplied = Uuid::new_v4();
        let mut property = unsaved_property(vec![]);
        property.id = supplied;

        changes.add_property(&mut property);
        assert_ne!(property.id, supplied);
    }

    #[test]
    fn test_add_property_keeps_existing_tenant_id() {
        let mut changes = ChangeSet::new();
        let existing = Uuid::new_v4();
        let mut t = tenant("Adam", "Ciszewski");
        t.id = existing;
        let mut property = unsaved_property(vec![t]);

        changes.add_property(&mut property);
        assert_eq!(property.tenants[0].id, existing);
    }

    #[test]
    fn test_add_property_never_reuses_ids() {
        let mut changes = ChangeSet::new();
        let mut seen = HashSet::new();
        for _ in 0..50 {
            let mut property = unsaved_property(vec![tenant("A", "B")]);
            changes.add_property(&mut property);
            assert!(seen.insert(property.id));
            assert!(seen.insert(property.tenants[0].id));
        }
        assert_eq!(changes.len(), 50);
    }

    #[test]
    fn test_add_tenant_assigns_id_and_property() {
        let mut changes = ChangeSet::new();
        let property_id = Uuid::new_v4();
        let mut t = tenant("Marta", "Lagiewska");

        changes.add_tenant(property_id, &mut t);

        assert!(!t.id.is_nil());
        assert_eq!(t.property_id, property_id);
        assert_eq!(changes.changes(), &[StagedChange::InsertTenant(t.clone())]);
    }

    #[test]
    fn test_changes_are_kept_in_staging_order() {
        let mut changes = ChangeSet::new();
        let mut property = unsaved_property(vec![]);
        changes.add_property(&mut property);
        changes.update_property(&property);

        let mut t = tenant("Justyna", "Ciszewska");
        changes.add_tenant(property.id, &mut t);
        changes.update_tenant(&t);
        changes.delete_tenant(&t);
        changes.delete_property(&property);

        let staged = changes.changes();
        assert_eq!(staged.len(), 6);
        assert!(matches!(staged[0], StagedChange::InsertProperty(_)));
        assert!(matches!(staged[1], StagedChange::UpdateProperty(_)));
        assert!(matches!(staged[2], StagedChange::InsertTenant(_)));
        assert!(matches!(staged[3], StagedChange::UpdateTenant(_)));
        assert_eq!(staged[4], StagedChange::DeleteTenant(t.id));
        assert_eq!(staged[5], StagedChange::DeleteProperty(property.id));
    }

    #[test]
    fn test_take_clears_the_change_set() {
        let mut changes = ChangeSet::new();
        let mut property = unsaved_property(vec![]);
        changes.add_property(&mut property);

        let taken = changes.take();
        assert_eq!(taken.len(), 1);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_update_stages_snapshot() {
        let mut changes = ChangeSet::new();
        let mut property = unsaved_property(vec![]);
        property.id = Uuid::new_v4();
        changes.update_property(&property);
        property.rent = Decimal::from(999);

        match &changes.changes()[0] {
            StagedChange::UpdateProperty(staged) => {
                assert_eq!(staged.rent, Decimal::from(450))
            }
            other => panic!("Expected UpdateProperty, got {:?}", other),
        }
    }
}
