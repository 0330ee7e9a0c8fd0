// SPDX-License-Identifier: Apache-2.0

use crate::{FleetStore, StoreError};
use rusqlite::{Connection, TransactionBehavior};
use taxi_fleet_model::{CarId, DriverId, Membership};
use tracing::{debug, info};

fn ensure_car(conn: &Connection, car: CarId) -> Result<(), StoreError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM car WHERE id = ?1)",
        [car.get()],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::not_found("car", car.get()))
    }
}

fn ensure_driver(conn: &Connection, driver: DriverId) -> Result<(), StoreError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM driver WHERE id = ?1)",
        [driver.get()],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::not_found("driver", driver.get()))
    }
}

fn linked(conn: &Connection, car: CarId, driver: DriverId) -> Result<bool, StoreError> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM car_driver WHERE car_id = ?1 AND driver_id = ?2)",
        [car.get(), driver.get()],
        |row| row.get(0),
    )?)
}

fn link(conn: &Connection, car: CarId, driver: DriverId) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO car_driver (car_id, driver_id) VALUES (?1, ?2)",
        [car.get(), driver.get()],
    )?;
    Ok(())
}

fn unlink(conn: &Connection, car: CarId, driver: DriverId) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM car_driver WHERE car_id = ?1 AND driver_id = ?2",
        [car.get(), driver.get()],
    )?;
    Ok(())
}

impl FleetStore {
    /// Flips `actor`'s membership on `car` and reports which way it went.
    ///
    /// Runs in one `IMMEDIATE` transaction so concurrent toggles serialize.
    /// A missing car leaves every relation untouched.
    pub fn toggle_car_driver(&self, actor: DriverId, car: CarId) -> Result<Membership, StoreError> {
        let outcome = self.with_conn(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            ensure_car(&tx, car)?;
            ensure_driver(&tx, actor)?;
            let outcome = if linked(&tx, car, actor)? {
                unlink(&tx, car, actor)?;
                Membership::Removed
            } else {
                link(&tx, car, actor)?;
                Membership::Added
            };
            tx.commit()?;
            Ok(outcome)
        })?;
        info!(car_id = car.get(), driver_id = actor.get(), outcome = ?outcome, "car membership toggled");
        Ok(outcome)
    }

    pub fn add_car_driver(&self, driver: DriverId, car: CarId) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            ensure_car(&tx, car)?;
            ensure_driver(&tx, driver)?;
            link(&tx, car, driver)?;
            tx.commit()?;
            debug!(car_id = car.get(), driver_id = driver.get(), "car driver added");
            Ok(())
        })
    }

    /// Removing an absent membership is a no-op.
    pub fn remove_car_driver(&self, driver: DriverId, car: CarId) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            ensure_car(&tx, car)?;
            unlink(&tx, car, driver)?;
            tx.commit()?;
            debug!(car_id = car.get(), driver_id = driver.get(), "car driver removed");
            Ok(())
        })
    }

    pub fn is_car_driver(&self, driver: DriverId, car: CarId) -> Result<bool, StoreError> {
        self.with_conn(|conn| linked(conn, car, driver))
    }
}
