use anyhow::Result;
use sqlx::{Row, Sqlite, SqliteConnection, sqlite::SqliteRow};

use crate::models::*;
use crate::db::row_helpers::{csv_to_vec, none_if_empty};
use crate::db::ValidationError;

pub(super) fn map_ip_address_row(row: &SqliteRow) -> IpAddress {
    IpAddress {
        id: row.get("id"),
        address: row.get("address"),
        family: row.get("family"),
        status: row.get("status"),
        assigned_object_type: none_if_empty(row.get("assigned_object_type")),
        assigned_object_id: row.try_get::<Option<i64>, _>("assigned_object_id").ok().flatten(),
        vrf_id: row.try_get::<Option<i64>, _>("vrf_id").ok().flatten(),
        vrf_name: row.try_get::<Option<String>, _>("vrf_name").ok().flatten(),
        tenant_id: row.try_get::<Option<i64>, _>("tenant_id").ok().flatten(),
        tenant_slug: row.try_get::<Option<String>, _>("tenant_slug").ok().flatten(),
        dns_name: none_if_empty(row.get("dns_name")),
        description: none_if_empty(row.get("description")),
        tags: csv_to_vec(row.try_get::<Option<String>, _>("tag_slugs_csv").ok().flatten()),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub(super) fn map_vrf_row(row: &SqliteRow) -> Vrf {
    Vrf {
        id: row.get("id"),
        name: row.get("name"),
        rd: none_if_empty(row.get("rd")),
        description: none_if_empty(row.get("description")),
        ip_address_count: row.try_get("ip_address_count").ok(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Resolve tag slugs to ids inside an open transaction. Unknown slugs are a validation error.
pub(crate) async fn resolve_tag_ids(conn: &mut SqliteConnection, slugs: &[String]) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let row: Option<(i64,)> = sqlx::query_as::<Sqlite, (i64,)>("SELECT id FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&mut *conn)
            .await?;
        match row {
            Some((id,)) => ids.push(id),
            None => return Err(ValidationError::new(format!("unknown tag '{}'", slug)).into()),
        }
    }
    Ok(ids)
}
