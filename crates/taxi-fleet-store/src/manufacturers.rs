// SPDX-License-Identifier: Apache-2.0

use crate::pagination::{fetch_page, Page, PageRequest};
use crate::row_decode::{manufacturer_at, MANUFACTURER_COLUMNS};
use crate::{FleetStore, StoreError};
use rusqlite::{params, OptionalExtension};
use taxi_fleet_model::{Manufacturer, ManufacturerId, NewManufacturer};
use tracing::debug;

const ENTITY: &str = "manufacturer";

impl FleetStore {
    pub fn create_manufacturer(&self, input: &NewManufacturer) -> Result<Manufacturer, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO manufacturer (name, country) VALUES (?1, ?2)",
                params![input.name(), input.country()],
            )?;
            let id = ManufacturerId::new(conn.last_insert_rowid());
            debug!(manufacturer_id = id.get(), "manufacturer created");
            Ok(Manufacturer {
                id,
                name: input.name().to_string(),
                country: input.country().to_string(),
            })
        })
    }

    pub fn get_manufacturer(&self, id: ManufacturerId) -> Result<Manufacturer, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {MANUFACTURER_COLUMNS} FROM manufacturer m WHERE m.id = ?1"),
                [id.get()],
                |row| manufacturer_at(row, 0),
            )
            .optional()?
            .ok_or(StoreError::not_found(ENTITY, id.get()))
        })
    }

    pub fn update_manufacturer(
        &self,
        id: ManufacturerId,
        input: &NewManufacturer,
    ) -> Result<Manufacturer, StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE manufacturer SET name = ?1, country = ?2 WHERE id = ?3",
                params![input.name(), input.country(), id.get()],
            )?;
            if changed == 0 {
                return Err(StoreError::not_found(ENTITY, id.get()));
            }
            Ok(Manufacturer {
                id,
                name: input.name().to_string(),
                country: input.country().to_string(),
            })
        })
    }

    /// Deletes the manufacturer; its cars and their driver links cascade.
    pub fn delete_manufacturer(&self, id: ManufacturerId) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM manufacturer WHERE id = ?1", [id.get()])?;
            if changed == 0 {
                return Err(StoreError::not_found(ENTITY, id.get()));
            }
            debug!(manufacturer_id = id.get(), "manufacturer deleted");
            Ok(())
        })
    }

    pub fn list_manufacturers(&self, page: PageRequest) -> Result<Page<Manufacturer>, StoreError> {
        self.with_conn(|conn| {
            fetch_page(
                conn,
                "SELECT COUNT(*) FROM manufacturer",
                &format!("SELECT {MANUFACTURER_COLUMNS} FROM manufacturer m ORDER BY m.name, m.id"),
                Vec::new(),
                page,
                |row| manufacturer_at(row, 0),
            )
        })
    }

    /// Every manufacturer ordered by name, as form choices need them.
    pub fn all_manufacturers(&self) -> Result<Vec<Manufacturer>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {MANUFACTURER_COLUMNS} FROM manufacturer m ORDER BY m.name, m.id"
            ))?;
            let rows = stmt
                .query_map([], |row| manufacturer_at(row, 0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
