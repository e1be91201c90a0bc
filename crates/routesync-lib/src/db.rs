use std::path::Path;

use rusqlite::{Connection, Row};
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::network::{CountryCode, NetworkBuilder, SegmentSpec, TransportMode};
use crate::policy::{CargoPolicyCatalog, CargoPolicyRule};

const LOCATIONS_TABLE: &str = "locations";
const SEGMENTS_TABLE: &str = "segments";
const POLICIES_TABLE: &str = "cargo_policies";

const LOCATION_COLUMNS: &[&str] = &["name", "country_code", "latitude", "longitude"];
const SEGMENT_COLUMNS: &[&str] = &[
    "from_location",
    "to_location",
    "mode",
    "time_hours",
    "price",
    "distance_km",
    "co2_kg",
    "bidirectional",
];
const POLICY_COLUMNS: &[&str] = &["cargo_type", "keywords", "prohibited_in", "restricted_in"];

/// Load a network (and optional cargo policies) from a SQLite database.
pub fn load_sqlite_dataset(db_path: &Path) -> Result<Dataset> {
    let connection = Connection::open(db_path)?;
    detect_schema(&connection)?;
    debug!(path = %db_path.display(), "loading network from sqlite");

    let mut builder = NetworkBuilder::new();
    load_locations(&connection, &mut builder)?;
    load_segments(&connection, &mut builder)?;
    let policies = load_policies(&connection)?;

    Ok(Dataset {
        network: builder.build(),
        policies,
    })
}

fn detect_schema(connection: &Connection) -> Result<()> {
    for (table, columns) in [
        (LOCATIONS_TABLE, LOCATION_COLUMNS),
        (SEGMENTS_TABLE, SEGMENT_COLUMNS),
    ] {
        if !table_exists(connection, table)? || !table_has_columns(connection, table, columns)? {
            return Err(Error::UnsupportedSchema);
        }
    }
    Ok(())
}

fn load_locations(connection: &Connection, builder: &mut NetworkBuilder) -> Result<()> {
    let sql = format!(
        "SELECT name, country_code, latitude, longitude FROM {LOCATIONS_TABLE} ORDER BY rowid"
    );
    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, f64>(3)?,
        ))
    })?;

    for row in rows {
        let (name, country, latitude, longitude) = row?;
        builder.add_location(&name, &country, latitude, longitude)?;
    }
    Ok(())
}

fn load_segments(connection: &Connection, builder: &mut NetworkBuilder) -> Result<()> {
    let sql = format!(
        "SELECT from_location, to_location, mode, time_hours, price, distance_km, co2_kg, \
         bidirectional FROM {SEGMENTS_TABLE} ORDER BY rowid"
    );
    let mut stmt = connection.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        builder.add_segment(row_to_segment(row)?)?;
    }
    Ok(())
}

fn row_to_segment(row: &Row<'_>) -> Result<SegmentSpec> {
    let from: String = row.get(0)?;
    let to: String = row.get(1)?;
    let mode: String = row.get(2)?;
    let mode = mode.parse::<TransportMode>().map_err(|_| {
        Error::invalid_dataset(format!(
            "segment {} -> {} has unknown mode '{}'",
            from, to, mode
        ))
    })?;

    Ok(SegmentSpec {
        from,
        to,
        mode,
        time_hours: row.get(3)?,
        price: row.get(4)?,
        distance_km: row.get(5)?,
        co2_kg: row.get(6)?,
        bidirectional: row.get::<_, Option<i64>>(7)?.unwrap_or(0) != 0,
    })
}

fn load_policies(connection: &Connection) -> Result<CargoPolicyCatalog> {
    if !table_exists(connection, POLICIES_TABLE)? {
        return Ok(CargoPolicyCatalog::default());
    }
    if !table_has_columns(connection, POLICIES_TABLE, POLICY_COLUMNS)? {
        return Err(Error::UnsupportedSchema);
    }

    let sql = format!(
        "SELECT cargo_type, keywords, prohibited_in, restricted_in FROM {POLICIES_TABLE} \
         ORDER BY rowid"
    );
    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, Option<String>>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    let mut rules = Vec::new();
    for row in rows {
        let (cargo_type, keywords, prohibited, restricted) = row?;
        rules.push(CargoPolicyRule {
            cargo_type: cargo_type.filter(|value| !value.trim().is_empty()),
            keywords: split_list(keywords.as_deref())
                .map(str::to_string)
                .collect(),
            prohibited_in: parse_codes(prohibited.as_deref())?,
            restricted_in: parse_codes(restricted.as_deref())?,
        });
    }
    debug!(rules = rules.len(), "loaded cargo policies");
    Ok(CargoPolicyCatalog::from_rules(rules))
}

fn split_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn parse_codes(value: Option<&str>) -> Result<Vec<CountryCode>> {
    split_list(value)
        .map(|code| {
            CountryCode::parse(code).map_err(|_| {
                Error::invalid_dataset(format!("cargo policy has invalid country code '{}'", code))
            })
        })
        .collect()
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}
