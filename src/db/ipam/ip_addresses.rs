use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::db::{Committed, ValidationError};
use crate::models::*;
use crate::utils;
use super::helpers::{map_ip_address_row, resolve_tag_ids};

const SELECT_IP_ADDRESS: &str = r#"
    SELECT ip.*,
           (SELECT GROUP_CONCAT(t.slug, ',') FROM ip_address_tags iat JOIN tags t ON t.id = iat.tag_id
             WHERE iat.ip_address_id = ip.id) as tag_slugs_csv,
           vrf.name as vrf_name,
           tn.slug as tenant_slug
    FROM ip_addresses ip
    LEFT JOIN vrfs vrf ON ip.vrf_id = vrf.id
    LEFT JOIN tenants tn ON ip.tenant_id = tn.id
"#;

fn validate_request(req: &CreateIpAddressRequest) -> Result<i32> {
    let family = utils::ip_family(&req.address).map_err(ValidationError::new)?;
    if !ip_status::ALL.contains(&req.status.as_str()) {
        return Err(ValidationError::new(format!("invalid status '{}'", req.status)).into());
    }
    match (req.assigned_object_type.as_deref(), req.assigned_object_id) {
        (None, None) => {}
        (Some(t), Some(_)) if assigned_object::ALL.contains(&t) => {}
        (Some(t), Some(_)) => {
            return Err(ValidationError::new(format!("invalid assigned object type '{}'", t)).into());
        }
        _ => {
            return Err(ValidationError::new(
                "assigned_object_type and assigned_object_id must be set together",
            )
            .into());
        }
    }
    Ok(family)
}

pub struct IpAddressRepo;

impl IpAddressRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<IpAddress>> {
        let rows = sqlx::query(&format!("{} ORDER BY ip.family, ip.address", SELECT_IP_ADDRESS))
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_ip_address_row).collect())
    }

    pub async fn list_by_interface(pool: &Pool<Sqlite>, interface_id: i64) -> Result<Vec<IpAddress>> {
        let rows = sqlx::query(&format!(
            "{} WHERE ip.assigned_object_type = ? AND ip.assigned_object_id = ? ORDER BY ip.address",
            SELECT_IP_ADDRESS
        ))
            .bind(assigned_object::INTERFACE).bind(interface_id)
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_ip_address_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<IpAddress>> {
        let row = sqlx::query(&format!("{} WHERE ip.id = ?", SELECT_IP_ADDRESS))
            .bind(id).fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_ip_address_row))
    }

    /// Insert an address and its tags in one transaction.
    /// The returned value is only produced once the transaction has committed.
    pub async fn create(pool: &Pool<Sqlite>, req: &CreateIpAddressRequest) -> Result<Committed<IpAddress>> {
        let family = validate_request(req)?;
        let now = Utc::now();

        let mut tx = pool.begin().await?;
        let tag_ids = resolve_tag_ids(&mut tx, &req.tags).await?;
        let result = sqlx::query(
            r#"INSERT INTO ip_addresses (address, family, status, assigned_object_type, assigned_object_id,
               vrf_id, tenant_id, dns_name, description, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(req.address.trim())
        .bind(family)
        .bind(&req.status)
        .bind(&req.assigned_object_type)
        .bind(req.assigned_object_id)
        .bind(req.vrf_id)
        .bind(req.tenant_id)
        .bind(req.dns_name.as_deref().unwrap_or(""))
        .bind(req.description.as_deref().unwrap_or(""))
        .bind(now)
        .bind(now)
        .execute(&mut *tx).await?;
        let new_id = result.last_insert_rowid();

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO ip_address_tags (ip_address_id, tag_id) VALUES (?, ?)")
                .bind(new_id).bind(tag_id)
                .execute(&mut *tx).await?;
        }
        tx.commit().await?;

        let ip = Self::get(pool, new_id).await?.context("IP address not found after creation")?;
        Ok(Committed::new(ip))
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &CreateIpAddressRequest) -> Result<Committed<IpAddress>> {
        let family = validate_request(req)?;

        let mut tx = pool.begin().await?;
        let tag_ids = resolve_tag_ids(&mut tx, &req.tags).await?;
        let result = sqlx::query(
            r#"UPDATE ip_addresses SET address = ?, family = ?, status = ?, assigned_object_type = ?,
               assigned_object_id = ?, vrf_id = ?, tenant_id = ?, dns_name = ?, description = ?,
               updated_at = ? WHERE id = ?"#
        )
        .bind(req.address.trim())
        .bind(family)
        .bind(&req.status)
        .bind(&req.assigned_object_type)
        .bind(req.assigned_object_id)
        .bind(req.vrf_id)
        .bind(req.tenant_id)
        .bind(req.dns_name.as_deref().unwrap_or(""))
        .bind(req.description.as_deref().unwrap_or(""))
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Err(crate::db::NotFoundError::new("IP Address", &id.to_string()).into());
        }

        // Replace tag associations
        sqlx::query("DELETE FROM ip_address_tags WHERE ip_address_id = ?")
            .bind(id).execute(&mut *tx).await?;
        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO ip_address_tags (ip_address_id, tag_id) VALUES (?, ?)")
                .bind(id).bind(tag_id)
                .execute(&mut *tx).await?;
        }
        tx.commit().await?;

        let ip = Self::get(pool, id).await?.context("IP address not found after update")?;
        Ok(Committed::new(ip))
    }

    /// Attach a tag. Returns false when the tag was already present.
    pub async fn add_tag(pool: &Pool<Sqlite>, id: i64, tag_id: i64) -> Result<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO ip_address_tags (ip_address_id, tag_id) VALUES (?, ?)")
            .bind(id).bind(tag_id)
            .execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_vrf(pool: &Pool<Sqlite>, id: i64, vrf_id: Option<i64>) -> Result<()> {
        let result = sqlx::query("UPDATE ip_addresses SET vrf_id = ?, updated_at = ? WHERE id = ?")
            .bind(vrf_id).bind(Utc::now()).bind(id)
            .execute(pool).await?;
        if result.rows_affected() == 0 {
            return Err(crate::db::NotFoundError::new("IP Address", &id.to_string()).into());
        }
        Ok(())
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM ip_addresses WHERE id = ?").bind(id).execute(pool).await?;
        if result.rows_affected() == 0 {
            return Err(crate::db::NotFoundError::new("IP Address", &id.to_string()).into());
        }
        Ok(())
    }
}
