//! Development seed data.
//!
//! Replaces the contents of the store with two sample properties so the
//! front-end has something to show on a fresh database.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::{uuid, Uuid};

use domain::models::{Property, Tenant};

use crate::repositories::property::insert_property;

fn sample_tenant(id: Uuid, property_id: Uuid, first_name: &str, last_name: &str) -> Tenant {
    let now = Utc::now();
    Tenant {
        id,
        property_id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// The sample properties, with fixed ids so links stay stable between runs.
pub fn sample_properties() -> Vec<Property> {
    let now = Utc::now();
    let worksop = uuid!("0b396766-0a09-4ce3-95f2-3c5b2735f513");
    let manton = uuid!("c8c44473-7c9c-4dd6-9462-d173a8e99da9");

    vec![
        Property {
            id: worksop,
            description: Some("Lovely flat based in central Worksop.".to_string()),
            market_value: Decimal::from(95000),
            rent: Decimal::from(390),
            costs: Decimal::from(120),
            house_number: 22,
            street: "Potter Street".to_string(),
            post_code: "S802AF".to_string(),
            country: "United Kingdom".to_string(),
            tenants: vec![
                sample_tenant(
                    uuid!("a806007b-b643-4c9e-8632-06f5ebf7dd1d"),
                    worksop,
                    "Adam",
                    "Ciszewski",
                ),
                sample_tenant(
                    uuid!("6abbea18-57e4-446b-91a5-6cf26e5ca04b"),
                    worksop,
                    "Justyna",
                    "Ciszewska",
                ),
            ],
            created_at: now,
            updated_at: now,
        },
        Property {
            id: manton,
            description: Some("Not so lovely flat close to Manton.".to_string()),
            market_value: Decimal::from(100000),
            rent: Decimal::from(450),
            costs: Decimal::from(160),
            house_number: 4,
            street: "Maple Leaf Gardens".to_string(),
            post_code: "S802PR".to_string(),
            country: "United Kingdom".to_string(),
            tenants: vec![sample_tenant(
                uuid!("bfd7f246-e873-4391-a6e0-af2aa75edc7c"),
                manton,
                "Marta",
                "Lagiewska",
            )],
            created_at: now,
            updated_at: now,
        },
    ]
}

/// Wipes all properties (tenants cascade) and inserts the sample data.
///
/// Returns the number of rows inserted.
pub async fn seed_development_data(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM properties")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let mut inserted = 0;
    for property in sample_properties() {
        inserted += insert_property(&mut tx, &property).await?;
    }
    tx.commit().await?;

    info!(removed = removed, inserted = inserted, "Development data seeded");
    Ok(inserted)
}
