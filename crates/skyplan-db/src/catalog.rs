//! The reference catalog of star systems: the 88 IAU constellations.
//!
//! Seeded once by `skyplan db-init` and read-only afterwards. Plans refer to
//! a row here by id; the workflow never mutates it.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

/// A catalog row before insertion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarSystemSeed {
    pub name: &'static str,
    pub meaning: &'static str,
    pub area_sq_deg: f64,
    pub quadrant: &'static str,
    pub latitude_max: i32,
    pub latitude_min: i32,
}

const fn seed(
    name: &'static str,
    meaning: &'static str,
    area_sq_deg: f64,
    quadrant: &'static str,
    latitude_max: i32,
    latitude_min: i32,
) -> StarSystemSeed {
    StarSystemSeed {
        name,
        meaning,
        area_sq_deg,
        quadrant,
        latitude_max,
        latitude_min,
    }
}

/// Name, meaning, area (square degrees), quadrant, max latitude, min latitude.
pub const STAR_SYSTEMS: &[StarSystemSeed] = &[
    seed("Andromeda", "Andromeda", 722.278, "NQ1", 90, 40),
    seed("Antlia", "Air Pump", 238.901, "SQ2", 45, 90),
    seed("Apus", "Bird of Paradise", 206.327, "SQ3", 5, 90),
    seed("Aquarius", "Water Bearer", 979.854, "SQ4", 65, 90),
    seed("Aquila", "Eagle", 652.473, "NQ4", 90, 75),
    seed("Ara", "Altar", 237.057, "SQ3", 25, 90),
    seed("Aries", "Ram", 441.395, "NQ1", 90, 60),
    seed("Auriga", "Charioteer", 657.438, "NQ2", 90, 40),
    seed("Boötes", "Herdsman", 906.831, "NQ3", 90, 50),
    seed("Caelum", "Chisel", 124.865, "SQ1", 40, 90),
    seed("Camelopardalis", "Giraffe", 756.828, "NQ2", 90, 10),
    seed("Cancer", "Crab", 505.872, "NQ2", 90, 60),
    seed("Canes Venatici", "Hunting Dogs", 465.194, "NQ3", 90, 40),
    seed("Canis Major", "Greater Dog", 380.118, "SQ2", 60, 90),
    seed("Canis Minor", "Lesser Dog", 183.367, "NQ2", 90, 75),
    seed("Capricornus", "Sea Goat", 413.947, "SQ4", 60, 90),
    seed("Carina", "Keel", 494.184, "SQ2", 20, 90),
    seed("Cassiopeia", "Cassiopeia", 598.407, "NQ1", 90, 20),
    seed("Centaurus", "Centaur", 1060.422, "SQ3", 25, 90),
    seed("Cepheus", "Cepheus", 587.787, "NQ4", 90, 10),
    seed("Cetus", "Whale (or Sea Monster)", 1231.411, "SQ1", 70, 90),
    seed("Chamaeleon", "Chameleon", 131.592, "SQ2", 0, 90),
    seed("Circinus", "Compass (drafting tool)", 93.353, "SQ3", 30, 90),
    seed("Columba", "Dove", 270.184, "SQ1", 45, 90),
    seed("Coma Berenices", "Berenice's Hair", 386.475, "NQ3", 90, 70),
    seed("Corona Australis", "Southern Crown", 127.696, "SQ4", 40, 90),
    seed("Corona Borealis", "Northern Crown", 178.710, "NQ3", 90, 50),
    seed("Corvus", "Crow", 183.801, "SQ3", 60, 90),
    seed("Crater", "Cup", 282.398, "SQ2", 65, 90),
    seed("Crux", "Southern Cross", 68.447, "SQ3", 20, 90),
    seed("Cygnus", "Swan", 803.983, "NQ4", 90, 40),
    seed("Delphinus", "Dolphin", 188.549, "NQ4", 90, 70),
    seed("Dorado", "Dolphinfish", 179.173, "SQ1", 20, 90),
    seed("Draco", "Dragon", 1082.952, "NQ3", 90, 15),
    seed("Equuleus", "Little Horse (Foal)", 71.641, "NQ4", 90, 80),
    seed("Eridanus", "Eridanus (river)", 1137.919, "SQ1", 32, 90),
    seed("Fornax", "Furnace", 397.502, "SQ1", 50, 90),
    seed("Gemini", "Twins", 513.761, "NQ2", 90, 60),
    seed("Grus", "Crane", 365.513, "SQ4", 34, 90),
    seed("Hercules", "Hercules", 1225.148, "NQ3", 90, 50),
    seed("Horologium", "Pendulum Clock", 248.885, "SQ1", 30, 90),
    seed("Hydra", "Hydra", 1302.844, "SQ2", 54, 83),
    seed("Hydrus", "Water Snake", 243.035, "SQ1", 8, 90),
    seed("Indus", "Indian", 294.006, "SQ4", 15, 90),
    seed("Lacerta", "Lizard", 200.688, "NQ4", 90, 40),
    seed("Leo", "Lion", 946.964, "NQ2", 90, 65),
    seed("Leo Minor", "Lesser Lion", 231.956, "NQ2", 90, 45),
    seed("Lepus", "Hare", 290.291, "SQ1", 63, 90),
    seed("Libra", "Scales", 538.052, "SQ3", 65, 90),
    seed("Lupus", "Wolf", 333.683, "SQ3", 35, 90),
    seed("Lynx", "Lynx", 545.386, "NQ2", 90, 55),
    seed("Lyra", "Lyre", 286.476, "NQ4", 90, 40),
    seed("Mensa", "Table Mountain", 153.484, "SQ1", 49, 90),
    seed("Microscopium", "Microscope", 209.513, "SQ4", 45, 90),
    seed("Monoceros", "Unicorn", 481.569, "NQ2", 75, 90),
    seed("Musca", "Fly", 138.355, "SQ3", 10, 90),
    seed("Norma", "Level", 165.290, "SQ3", 30, 90),
    seed("Octans", "Octant", 291.045, "SQ4", 0, 90),
    seed("Ophiuchus", "Serpent Bearer", 948.340, "SQ3", 80, 80),
    seed("Orion", "Orion (the Hunter)", 594.120, "NQ1", 85, 75),
    seed("Pavo", "Peacock", 377.666, "SQ4", 30, 90),
    seed("Pegasus", "Pegasus", 1120.794, "NQ4", 90, 60),
    seed("Perseus", "Perseus", 614.997, "NQ1", 90, 35),
    seed("Phoenix", "Phoenix", 469.319, "SQ1", 32, 80),
    seed("Pictor", "Easel", 246.739, "SQ1", 26, 90),
    seed("Pisces", "Fishes", 889.417, "NQ1", 90, 65),
    seed("Piscis Austrinus", "Southern Fish", 245.375, "SQ4", 55, 90),
    seed("Puppis", "Stern", 673.434, "SQ2", 40, 90),
    seed("Pyxis", "Compass", 220.833, "SQ2", 50, 90),
    seed("Reticulum", "Reticle", 113.936, "SQ1", 23, 90),
    seed("Sagitta", "Arrow", 79.932, "NQ4", 90, 70),
    seed("Sagittarius", "Archer", 867.432, "SQ4", 55, 90),
    seed("Scorpius", "Scorpion", 496.783, "SQ3", 40, 90),
    seed("Sculptor", "Sculptor", 474.764, "SQ1", 50, 90),
    seed("Scutum", "Shield (of Sobieski)", 109.114, "SQ4", 80, 90),
    seed("Serpens", "Snake", 636.928, "NQ3", 80, 80),
    seed("Sextans", "Sextant", 313.515, "SQ2", 80, 90),
    seed("Taurus", "Bull", 797.249, "NQ1", 90, 65),
    seed("Telescopium", "Telescope", 251.512, "SQ4", 40, 90),
    seed("Triangulum", "Triangle", 131.847, "NQ1", 90, 60),
    seed("Triangulum Australe", "Southern Triangle", 109.978, "SQ3", 25, 90),
    seed("Tucana", "Toucan", 294.557, "SQ4", 25, 90),
    seed("Ursa Major", "Great Bear", 1279.660, "NQ2", 90, 30),
    seed("Ursa Minor", "Little Bear", 255.864, "NQ3", 90, 10),
    seed("Vela", "Sails", 499.649, "SQ2", 30, 90),
    seed("Virgo", "Virgin (Maiden)", 1294.428, "SQ3", 80, 80),
    seed("Volans", "Flying Fish", 141.354, "SQ2", 15, 90),
    seed("Vulpecula", "Fox", 268.165, "NQ4", 90, 55),
];

/// Insert every catalog row that is not already present.
///
/// Idempotent: existing names are left untouched. Returns the number of rows
/// inserted by this call.
pub async fn seed_star_systems(pool: &PgPool) -> Result<u64> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;
    let mut inserted = 0;

    for row in STAR_SYSTEMS {
        let result = sqlx::query(
            "INSERT INTO star_systems \
             (name, meaning, area_sq_deg, quadrant, latitude_max, latitude_min) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(row.name)
        .bind(row.meaning)
        .bind(row.area_sq_deg)
        .bind(row.quadrant)
        .bind(row.latitude_max)
        .bind(row.latitude_min)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to seed star system {:?}", row.name))?;
        inserted += result.rows_affected();
    }

    tx.commit().await.context("failed to commit catalog seed")?;

    info!(inserted, total = STAR_SYSTEMS.len(), "star catalog seeded");
    Ok(inserted)
}
