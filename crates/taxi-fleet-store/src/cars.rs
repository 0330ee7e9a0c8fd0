// SPDX-License-Identifier: Apache-2.0

use crate::pagination::{fetch_page, Page, PageRequest};
use crate::row_decode::{
    car_listing_at, driver_at, CAR_COLUMNS, DRIVER_COLUMNS, MANUFACTURER_COLUMNS,
};
use crate::{FleetStore, StoreError};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::BTreeSet;
use taxi_fleet_model::{CarDetail, CarId, CarListing, DriverId, ManufacturerId, NewCar};
use tracing::debug;

const ENTITY: &str = "car";

/// Admin changelist filters: `q` matches the model text, `manufacturer` narrows by maker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarSearch {
    pub query: Option<String>,
    pub manufacturer: Option<ManufacturerId>,
}

impl FleetStore {
    /// Creates the car and its driver links in one transaction.
    pub fn create_car(&self, input: &NewCar) -> Result<CarId, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            check_references(&tx, input.manufacturer_id(), input.driver_ids())?;
            tx.execute(
                "INSERT INTO car (model, manufacturer_id) VALUES (?1, ?2)",
                params![input.model(), input.manufacturer_id().get()],
            )?;
            let id = CarId::new(tx.last_insert_rowid());
            insert_links(&tx, id, input.driver_ids())?;
            tx.commit()?;
            debug!(car_id = id.get(), drivers = input.driver_ids().len(), "car created");
            Ok(id)
        })
    }

    /// Replaces the model, manufacturer and the whole driver set.
    pub fn update_car(&self, id: CarId, input: &NewCar) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM car WHERE id = ?1)",
                [id.get()],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(StoreError::not_found(ENTITY, id.get()));
            }
            check_references(&tx, input.manufacturer_id(), input.driver_ids())?;
            tx.execute(
                "UPDATE car SET model = ?1, manufacturer_id = ?2 WHERE id = ?3",
                params![input.model(), input.manufacturer_id().get(), id.get()],
            )?;
            tx.execute("DELETE FROM car_driver WHERE car_id = ?1", [id.get()])?;
            insert_links(&tx, id, input.driver_ids())?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn delete_car(&self, id: CarId) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM car WHERE id = ?1", [id.get()])?;
            if changed == 0 {
                return Err(StoreError::not_found(ENTITY, id.get()));
            }
            debug!(car_id = id.get(), "car deleted");
            Ok(())
        })
    }

    pub fn get_car(&self, id: CarId) -> Result<CarListing, StoreError> {
        self.with_conn(|conn| load_listing(conn, id))
    }

    /// Car with its manufacturer and drivers.
    pub fn get_car_detail(&self, id: CarId) -> Result<CarDetail, StoreError> {
        self.with_conn(|conn| {
            let listing = load_listing(conn, id)?;
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {DRIVER_COLUMNS} FROM driver d
                 JOIN car_driver cd ON cd.driver_id = d.id
                 WHERE cd.car_id = ?1 ORDER BY d.username"
            ))?;
            let drivers = stmt
                .query_map([id.get()], |row| driver_at(row, 0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CarDetail {
                car: listing.car,
                manufacturer: listing.manufacturer,
                drivers,
            })
        })
    }

    /// Cars joined with their manufacturer in a single query.
    pub fn list_cars(&self, page: PageRequest) -> Result<Page<CarListing>, StoreError> {
        self.search_cars(&CarSearch::default(), page)
    }

    pub fn search_cars(
        &self,
        search: &CarSearch,
        page: PageRequest,
    ) -> Result<Page<CarListing>, StoreError> {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        if let Some(q) = search.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            clauses.push("c.model LIKE ? ESCAPE '\\'");
            params.push(Value::Text(like_pattern(q)));
        }
        if let Some(manufacturer) = search.manufacturer {
            clauses.push("c.manufacturer_id = ?");
            params.push(Value::Integer(manufacturer.get()));
        }
        let filter = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        self.with_conn(|conn| {
            fetch_page(
                conn,
                &format!("SELECT COUNT(*) FROM car c{filter}"),
                &format!(
                    "SELECT {CAR_COLUMNS}, {MANUFACTURER_COLUMNS} FROM car c
                     JOIN manufacturer m ON m.id = c.manufacturer_id{filter}
                     ORDER BY c.id"
                ),
                params,
                page,
                |row| car_listing_at(row, 0),
            )
        })
    }
}

fn load_listing(conn: &Connection, id: CarId) -> Result<CarListing, StoreError> {
    conn.query_row(
        &format!(
            "SELECT {CAR_COLUMNS}, {MANUFACTURER_COLUMNS} FROM car c
             JOIN manufacturer m ON m.id = c.manufacturer_id WHERE c.id = ?1"
        ),
        [id.get()],
        |row| car_listing_at(row, 0),
    )
    .optional()?
    .ok_or(StoreError::not_found(ENTITY, id.get()))
}

/// Names the offending field before SQLite reports an anonymous foreign-key failure.
fn check_references(
    tx: &Transaction<'_>,
    manufacturer: ManufacturerId,
    drivers: &BTreeSet<DriverId>,
) -> Result<(), StoreError> {
    let exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM manufacturer WHERE id = ?1)",
        [manufacturer.get()],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(StoreError::constraint(
            "manufacturer",
            format!("manufacturer {manufacturer} does not exist"),
        ));
    }
    let mut stmt = tx.prepare_cached("SELECT EXISTS(SELECT 1 FROM driver WHERE id = ?1)")?;
    for driver in drivers {
        let exists: bool = stmt.query_row([driver.get()], |row| row.get(0))?;
        if !exists {
            return Err(StoreError::constraint(
                "drivers",
                format!("driver {driver} does not exist"),
            ));
        }
    }
    Ok(())
}

fn insert_links(
    tx: &Transaction<'_>,
    car: CarId,
    drivers: &BTreeSet<DriverId>,
) -> Result<(), StoreError> {
    let mut stmt =
        tx.prepare_cached("INSERT OR IGNORE INTO car_driver (car_id, driver_id) VALUES (?1, ?2)")?;
    for driver in drivers {
        stmt.execute([car.get(), driver.get()])?;
    }
    Ok(())
}

fn like_pattern(query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 2);
    out.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
