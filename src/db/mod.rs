mod device_roles;
mod device_types;
mod devices;
mod entnets;
#[cfg(test)]
pub(crate) mod fixtures;
mod interfaces;
mod ipam;
mod jobs;
mod manufacturers;
pub(crate) mod row_helpers;
mod settings;
mod tags;
mod tenants;

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::models::*;

pub use device_roles::DeviceRoleRepo;
pub use device_types::DeviceTypeRepo;
pub use devices::DeviceRepo;
pub use entnets::EntNetRepo;
pub use interfaces::InterfaceRepo;
pub use ipam::{IpAddressRepo, VrfRepo};
pub use jobs::JobRunRepo;
pub use manufacturers::ManufacturerRepo;
pub use settings::SettingsRepo;
pub use tags::TagRepo;
pub use tenants::TenantRepo;

/// Typed error for "resource not found", downcast by the API error handler
#[derive(Debug)]
pub struct NotFoundError {
    pub resource: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.resource, self.id)
    }
}

impl std::error::Error for NotFoundError {}

/// Typed error for rejected input (bad address, unknown tag, invalid custom field)
#[derive(Debug)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// A record whose write transaction has committed.
///
/// Post-save side effects take this instead of a bare record so they can
/// only be scheduled once the data is durable.
#[derive(Debug, Clone)]
pub struct Committed<T>(T);

impl<T> Committed<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Store handles all database operations, delegating to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database; a single connection that never expires keeps it alive
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;

        SettingsRepo::ensure_defaults(&self.pool).await?;
        Ok(())
    }

    // ========== Manufacturer Operations ==========

    pub async fn list_manufacturers(&self) -> Result<Vec<Manufacturer>> {
        ManufacturerRepo::list(&self.pool).await
    }

    pub async fn get_manufacturer(&self, id: i64) -> Result<Option<Manufacturer>> {
        ManufacturerRepo::get(&self.pool, id).await
    }

    pub async fn create_manufacturer(&self, req: &CreateManufacturerRequest) -> Result<Manufacturer> {
        ManufacturerRepo::create(&self.pool, req).await
    }

    pub async fn update_manufacturer(&self, id: i64, req: &CreateManufacturerRequest) -> Result<Manufacturer> {
        ManufacturerRepo::update(&self.pool, id, req).await
    }

    pub async fn delete_manufacturer(&self, id: i64) -> Result<()> {
        ManufacturerRepo::delete(&self.pool, id).await
    }

    // ========== Device Role Operations ==========

    pub async fn list_device_roles(&self) -> Result<Vec<DeviceRole>> {
        DeviceRoleRepo::list(&self.pool).await
    }

    pub async fn get_device_role(&self, id: i64) -> Result<Option<DeviceRole>> {
        DeviceRoleRepo::get(&self.pool, id).await
    }

    pub async fn create_device_role(&self, req: &CreateDeviceRoleRequest) -> Result<DeviceRole> {
        DeviceRoleRepo::create(&self.pool, req).await
    }

    pub async fn update_device_role(&self, id: i64, req: &CreateDeviceRoleRequest) -> Result<DeviceRole> {
        DeviceRoleRepo::update(&self.pool, id, req).await
    }

    pub async fn delete_device_role(&self, id: i64) -> Result<()> {
        DeviceRoleRepo::delete(&self.pool, id).await
    }

    // ========== Device Type Operations ==========

    pub async fn list_device_types(&self) -> Result<Vec<DeviceType>> {
        DeviceTypeRepo::list(&self.pool).await
    }

    pub async fn list_device_types_with_policy(&self) -> Result<Vec<DeviceType>> {
        DeviceTypeRepo::list_with_policy(&self.pool).await
    }

    pub async fn get_device_type(&self, id: i64) -> Result<Option<DeviceType>> {
        DeviceTypeRepo::get(&self.pool, id).await
    }

    pub async fn create_device_type(&self, req: &CreateDeviceTypeRequest) -> Result<DeviceType> {
        DeviceTypeRepo::create(&self.pool, req).await
    }

    pub async fn update_device_type(&self, id: i64, req: &CreateDeviceTypeRequest) -> Result<DeviceType> {
        DeviceTypeRepo::update(&self.pool, id, req).await
    }

    pub async fn delete_device_type(&self, id: i64) -> Result<()> {
        DeviceTypeRepo::delete(&self.pool, id).await
    }

    // ========== Device Operations ==========

    pub async fn list_devices_paged(&self, limit: i32, offset: i32) -> Result<Vec<Device>> {
        DeviceRepo::list_paged(&self.pool, limit, offset).await
    }

    /// Devices of a type that have a primary IPv4 address, ordered by name
    pub async fn list_devices_for_review(&self, device_type_id: i64) -> Result<Vec<Device>> {
        DeviceRepo::list_by_type_with_primary_ip4(&self.pool, device_type_id).await
    }

    pub async fn get_device(&self, id: i64) -> Result<Option<Device>> {
        DeviceRepo::get(&self.pool, id).await
    }

    pub async fn create_device(&self, req: &CreateDeviceRequest) -> Result<Device> {
        DeviceRepo::create(&self.pool, req).await
    }

    pub async fn update_device(&self, id: i64, req: &CreateDeviceRequest) -> Result<Device> {
        DeviceRepo::update(&self.pool, id, req).await
    }

    pub async fn save_device_custom_fields(&self, id: i64, fields: &SoftwareFields) -> Result<()> {
        DeviceRepo::save_custom_fields(&self.pool, id, fields).await
    }

    pub async fn delete_device(&self, id: i64) -> Result<()> {
        DeviceRepo::delete(&self.pool, id).await
    }

    // ========== Interface Operations ==========

    pub async fn list_interfaces(&self, device_id: i64) -> Result<Vec<Interface>> {
        InterfaceRepo::list_by_device(&self.pool, device_id).await
    }

    pub async fn get_interface(&self, id: i64) -> Result<Option<Interface>> {
        InterfaceRepo::get(&self.pool, id).await
    }

    pub async fn create_interface(&self, req: &CreateInterfaceRequest) -> Result<Interface> {
        InterfaceRepo::create(&self.pool, req).await
    }

    pub async fn delete_interface(&self, id: i64) -> Result<()> {
        InterfaceRepo::delete(&self.pool, id).await
    }

    // ========== IP Address Operations ==========

    pub async fn list_ip_addresses(&self) -> Result<Vec<IpAddress>> {
        IpAddressRepo::list(&self.pool).await
    }

    pub async fn list_ip_addresses_by_interface(&self, interface_id: i64) -> Result<Vec<IpAddress>> {
        IpAddressRepo::list_by_interface(&self.pool, interface_id).await
    }

    pub async fn get_ip_address(&self, id: i64) -> Result<Option<IpAddress>> {
        IpAddressRepo::get(&self.pool, id).await
    }

    pub async fn create_ip_address(&self, req: &CreateIpAddressRequest) -> Result<Committed<IpAddress>> {
        IpAddressRepo::create(&self.pool, req).await
    }

    pub async fn update_ip_address(&self, id: i64, req: &CreateIpAddressRequest) -> Result<Committed<IpAddress>> {
        IpAddressRepo::update(&self.pool, id, req).await
    }

    pub async fn add_ip_address_tag(&self, id: i64, tag_id: i64) -> Result<bool> {
        IpAddressRepo::add_tag(&self.pool, id, tag_id).await
    }

    /// Sets the VRF without going through the save path, so no post-save hook fires
    pub async fn set_ip_address_vrf(&self, id: i64, vrf_id: Option<i64>) -> Result<()> {
        IpAddressRepo::set_vrf(&self.pool, id, vrf_id).await
    }

    pub async fn delete_ip_address(&self, id: i64) -> Result<()> {
        IpAddressRepo::delete(&self.pool, id).await
    }

    // ========== VRF Operations ==========

    pub async fn list_vrfs(&self) -> Result<Vec<Vrf>> {
        VrfRepo::list(&self.pool).await
    }

    pub async fn get_vrf(&self, id: i64) -> Result<Option<Vrf>> {
        VrfRepo::get(&self.pool, id).await
    }

    pub async fn find_vrf_by_name(&self, name: &str) -> Result<Option<Vrf>> {
        VrfRepo::find_by_name(&self.pool, name).await
    }

    pub async fn create_vrf(&self, req: &CreateVrfRequest) -> Result<Vrf> {
        VrfRepo::create(&self.pool, req).await
    }

    pub async fn update_vrf(&self, id: i64, req: &CreateVrfRequest) -> Result<Vrf> {
        VrfRepo::update(&self.pool, id, req).await
    }

    pub async fn delete_vrf(&self, id: i64) -> Result<()> {
        VrfRepo::delete(&self.pool, id).await
    }

    // ========== Tenant Operations ==========

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>> {
        TenantRepo::list(&self.pool).await
    }

    pub async fn get_tenant(&self, id: i64) -> Result<Option<Tenant>> {
        TenantRepo::get(&self.pool, id).await
    }

    pub async fn create_tenant(&self, req: &CreateTenantRequest) -> Result<Tenant> {
        TenantRepo::create(&self.pool, req).await
    }

    pub async fn update_tenant(&self, id: i64, req: &CreateTenantRequest) -> Result<Tenant> {
        TenantRepo::update(&self.pool, id, req).await
    }

    pub async fn delete_tenant(&self, id: i64) -> Result<()> {
        TenantRepo::delete(&self.pool, id).await
    }

    // ========== Tag Operations ==========

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        TagRepo::list(&self.pool).await
    }

    pub async fn get_tag(&self, id: i64) -> Result<Option<Tag>> {
        TagRepo::get(&self.pool, id).await
    }

    pub async fn get_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        TagRepo::get_by_slug(&self.pool, slug).await
    }

    pub async fn create_tag(&self, req: &CreateTagRequest) -> Result<Tag> {
        TagRepo::create(&self.pool, req).await
    }

    pub async fn update_tag(&self, id: i64, req: &CreateTagRequest) -> Result<Tag> {
        TagRepo::update(&self.pool, id, req).await
    }

    pub async fn delete_tag(&self, id: i64) -> Result<()> {
        TagRepo::delete(&self.pool, id).await
    }

    // ========== EntNet Operations ==========

    pub async fn list_entnets(&self) -> Result<Vec<EntNet>> {
        EntNetRepo::list(&self.pool).await
    }

    pub async fn get_entnet(&self, id: i64) -> Result<Option<EntNet>> {
        EntNetRepo::get(&self.pool, id).await
    }

    pub async fn create_entnet(&self, req: &CreateEntNetRequest) -> Result<EntNet> {
        EntNetRepo::create(&self.pool, req).await
    }

    pub async fn update_entnet(&self, id: i64, req: &CreateEntNetRequest) -> Result<EntNet> {
        EntNetRepo::update(&self.pool, id, req).await
    }

    pub async fn delete_entnet(&self, id: i64) -> Result<()> {
        EntNetRepo::delete(&self.pool, id).await
    }

    // ========== Settings Operations ==========

    pub async fn get_settings(&self) -> Result<PluginSettings> {
        SettingsRepo::get(&self.pool).await
    }

    pub async fn update_settings(&self, settings: &PluginSettings) -> Result<()> {
        SettingsRepo::update(&self.pool, settings).await
    }

    // ========== Job Run Operations ==========

    pub async fn create_job_run(&self, id: &str, req: &CreateJobRunRequest) -> Result<JobRun> {
        JobRunRepo::create(&self.pool, id, req).await
    }

    pub async fn get_job_run(&self, id: &str) -> Result<Option<JobRun>> {
        JobRunRepo::get(&self.pool, id).await
    }

    pub async fn list_job_runs(&self, limit: i32) -> Result<Vec<JobRun>> {
        JobRunRepo::list_recent(&self.pool, limit).await
    }

    pub async fn mark_job_running(&self, id: &str) -> Result<()> {
        JobRunRepo::mark_running(&self.pool, id).await
    }

    pub async fn mark_job_completed(&self, id: &str, data: &JobLog) -> Result<()> {
        JobRunRepo::mark_completed(&self.pool, id, data).await
    }

    pub async fn mark_job_errored(&self, id: &str, data: &JobLog, error: &str) -> Result<()> {
        JobRunRepo::mark_errored(&self.pool, id, data, error).await
    }

    pub async fn fail_stuck_job_runs(&self) -> Result<u64> {
        JobRunRepo::fail_stuck(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_tag(store: &Store, slug: &str) -> Tag {
        store
            .create_tag(&CreateTagRequest {
                name: slug.to_string(),
                slug: Some(slug.to_string()),
                color: "9e9e9e".to_string(),
            })
            .await
            .unwrap()
    }

    fn ip_request(address: &str) -> CreateIpAddressRequest {
        serde_json::from_value(serde_json::json!({ "address": address })).unwrap()
    }

    #[tokio::test]
    async fn test_default_settings_seeded() {
        let store = Store::in_memory().await.unwrap();
        let settings = store.get_settings().await.unwrap();
        assert_eq!(settings, PluginSettings::default());
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let store = Store::in_memory().await.unwrap();
        let mut settings = store.get_settings().await.unwrap();
        settings.default_vrf_name = "mgmt".to_string();
        settings
            .tenant_tag_to_ip_tag
            .insert("acme".to_string(), "acme-ip".to_string());
        store.update_settings(&settings).await.unwrap();
        assert_eq!(store.get_settings().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_ip_address_create_resolves_tags() {
        let store = Store::in_memory().await.unwrap();
        seed_tag(&store, "core").await;

        let mut req = ip_request("10.0.0.1/24");
        req.tags = vec!["core".to_string()];
        let ip = store.create_ip_address(&req).await.unwrap().into_inner();

        assert_eq!(ip.family, 4);
        assert_eq!(ip.tags, vec!["core".to_string()]);
    }

    #[tokio::test]
    async fn test_ip_address_unknown_tag_rolls_back() {
        let store = Store::in_memory().await.unwrap();

        let mut req = ip_request("10.0.0.1/24");
        req.tags = vec!["missing".to_string()];
        let err = store.create_ip_address(&req).await.unwrap_err();

        assert!(err.downcast_ref::<ValidationError>().is_some());
        assert!(store.list_ip_addresses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ip_address_rejects_bad_address() {
        let store = Store::in_memory().await.unwrap();
        let err = store
            .create_ip_address(&ip_request("10.0.0.300/24"))
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }

    #[tokio::test]
    async fn test_add_tag_is_idempotent() {
        let store = Store::in_memory().await.unwrap();
        let tag = seed_tag(&store, "network-mgmt").await;
        let ip = store
            .create_ip_address(&ip_request("192.0.2.1/32"))
            .await
            .unwrap()
            .into_inner();

        assert!(store.add_ip_address_tag(ip.id, tag.id).await.unwrap());
        assert!(!store.add_ip_address_tag(ip.id, tag.id).await.unwrap());
        let ip = store.get_ip_address(ip.id).await.unwrap().unwrap();
        assert_eq!(ip.tags, vec!["network-mgmt".to_string()]);
    }

    #[tokio::test]
    async fn test_update_missing_returns_not_found() {
        let store = Store::in_memory().await.unwrap();
        let err = store
            .update_tenant(
                42,
                &CreateTenantRequest {
                    name: "Acme".to_string(),
                    slug: None,
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<NotFoundError>().is_some());
    }

    #[tokio::test]
    async fn test_job_run_lifecycle() {
        let store = Store::in_memory().await.unwrap();
        let req = CreateJobRunRequest {
            name: job_name::SW_CURRENCY_LINT.to_string(),
            triggered_by: "manual".to_string(),
        };
        let run = store.create_job_run("run-1", &req).await.unwrap();
        assert_eq!(run.status, job_status::PENDING);

        store.mark_job_running("run-1").await.unwrap();
        let mut log = JobLog::new();
        log.log("Version data passed lint check");
        store.mark_job_completed("run-1", &log).await.unwrap();

        let run = store.get_job_run("run-1").await.unwrap().unwrap();
        assert_eq!(run.status, job_status::COMPLETED);
        assert!(run.data.contains("Version data passed lint check"));
        assert!(run.started_at.is_some());
        assert!(run.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_fail_stuck_marks_pending_and_running() {
        let store = Store::in_memory().await.unwrap();
        let req = CreateJobRunRequest {
            name: job_name::SW_CURRENCY_REVIEW.to_string(),
            triggered_by: "schedule".to_string(),
        };
        store.create_job_run("a", &req).await.unwrap();
        store.create_job_run("b", &req).await.unwrap();
        store.mark_job_running("b").await.unwrap();
        store.create_job_run("c", &req).await.unwrap();
        store.mark_job_completed("c", &JobLog::new()).await.unwrap();

        assert_eq!(store.fail_stuck_job_runs().await.unwrap(), 2);
        let c = store.get_job_run("c").await.unwrap().unwrap();
        assert_eq!(c.status, job_status::COMPLETED);
        let a = store.get_job_run("a").await.unwrap().unwrap();
        assert_eq!(a.status, job_status::ERRORED);
    }
}
