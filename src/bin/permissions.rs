//! View and grant permissions on a space. Pass the space id as the first
//! argument; an optional second argument names a CLI auth profile.
//!
//! PATCH grants are additive; PUT replaces the entire access-control list.

use anyhow::Result;
use genie_spaces_rust::{
    AccessControlRequest, AppConfig, HttpStore, PermissionLevel, PermissionStore,
};
use itertools::Itertools;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let space_id = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: permissions <space-id> [profile]"))?;

    let mut config = AppConfig::load()?;
    if let Some(profile) = std::env::args().nth(2) {
        config = config.with_cli_token(&profile)?;
    }
    let store = HttpStore::new(config);

    println!("=== Valid Permission Levels ===");
    for level in store.get_permission_levels(&space_id)? {
        println!("  {:?}: {}", level.permission_level, level.description);
    }

    println!("\n=== Current Permissions ===");
    let permissions = store.get_permissions(&space_id)?;
    for entry in &permissions.access_control_list {
        let levels = entry
            .levels()
            .iter()
            .map(|l| format!("{l:?}"))
            .join(", ");
        println!("  {}: {}", entry.principal(), levels);
    }

    println!("\n=== Bulk Grant (additive) ===");
    let grants = vec![
        AccessControlRequest::user("analyst@company.com", PermissionLevel::CanRead),
        AccessControlRequest::user("data-engineer@company.com", PermissionLevel::CanEdit),
        AccessControlRequest::group("finance-analysts", PermissionLevel::CanRun),
        AccessControlRequest::group("finance-admins", PermissionLevel::CanManage),
        AccessControlRequest::service_principal(
            "etl-pipeline-sp",
            PermissionLevel::CanRun,
        ),
    ];
    let updated = store.grant_permissions(&space_id, &grants)?;
    println!(
        "ACL now has {} entries.",
        updated.access_control_list.len()
    );

    Ok(())
}
