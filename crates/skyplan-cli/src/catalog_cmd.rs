use anyhow::Result;
use sqlx::PgPool;

use skyplan_core::Role;
use skyplan_core::service;

/// List the star system catalog.
pub async fn run_catalog_list(pool: &PgPool, role: Option<Role>) -> Result<()> {
    let systems = service::list_star_systems(pool, role).await?;

    if systems.is_empty() {
        println!("Catalog is empty. Run `skyplan db-init` to seed it.");
        return Ok(());
    }

    println!(
        "{:<20}  {:<8}  {:>8}  {:>9}  MEANING",
        "NAME", "QUADRANT", "AREA", "LATITUDE"
    );
    for s in &systems {
        println!(
            "{:<20}  {:<8}  {:>8.1}  {:>4}/{:<4}  {}",
            s.name, s.quadrant, s.area_sq_deg, s.latitude_max, s.latitude_min, s.meaning
        );
    }
    Ok(())
}
