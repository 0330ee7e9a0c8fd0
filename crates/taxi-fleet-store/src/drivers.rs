// SPDX-License-Identifier: Apache-2.0

use crate::pagination::{fetch_page, Page, PageRequest};
use crate::row_decode::{
    car_listing_at, driver_at, CAR_COLUMNS, DRIVER_COLUMNS, MANUFACTURER_COLUMNS,
};
use crate::{unix_now, FleetStore, StoreError};
use rusqlite::{params, Connection, OptionalExtension};
use taxi_fleet_core::secrets::{hash_password, random_salt, verify_password};
use taxi_fleet_model::{Driver, DriverDetail, DriverId, LicenseNumber, NewDriver};
use tracing::{debug, info};

const ENTITY: &str = "driver";

impl FleetStore {
    /// Persists a new driver account with a salted password digest.
    pub fn register_driver(&self, input: &NewDriver) -> Result<Driver, StoreError> {
        let username = input.username().as_str();
        let password_hash = hash_password(&random_salt(), input.password());
        let date_joined = unix_now();
        let id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO driver (username, password_hash, first_name, last_name, email,
                                     is_active, is_staff, date_joined, license_number)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7, ?8)",
                params![
                    username,
                    password_hash,
                    input.first_name(),
                    input.last_name(),
                    input.email(),
                    input.is_staff(),
                    date_joined,
                    input.license_number().as_str(),
                ],
            )?;
            Ok(DriverId::new(conn.last_insert_rowid()))
        })?;
        info!(driver_id = id.get(), is_staff = input.is_staff(), "driver registered");
        self.get_driver(id)
    }

    pub fn get_driver(&self, id: DriverId) -> Result<Driver, StoreError> {
        self.with_conn(|conn| load_driver(conn, id))
    }

    /// Driver with the cars they drive, each joined with its manufacturer.
    pub fn get_driver_detail(&self, id: DriverId) -> Result<DriverDetail, StoreError> {
        self.with_conn(|conn| {
            let driver = load_driver(conn, id)?;
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {CAR_COLUMNS}, {MANUFACTURER_COLUMNS} FROM car c
                 JOIN car_driver cd ON cd.car_id = c.id
                 JOIN manufacturer m ON m.id = c.manufacturer_id
                 WHERE cd.driver_id = ?1 ORDER BY c.id"
            ))?;
            let cars = stmt
                .query_map([id.get()], |row| car_listing_at(row, 0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DriverDetail { driver, cars })
        })
    }

    pub fn find_driver_by_username(&self, username: &str) -> Result<Option<Driver>, StoreError> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {DRIVER_COLUMNS} FROM driver d WHERE d.username = ?1"),
                    [username],
                    |row| driver_at(row, 0),
                )
                .optional()?)
        })
    }

    /// Returns the active driver whose password matches, or `None`.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<Driver>, StoreError> {
        let found = self.find_driver_by_username(username)?;
        Ok(found.filter(|driver| {
            driver.account.is_active && verify_password(&driver.account.password_hash, password)
        }))
    }

    pub fn update_license_number(
        &self,
        id: DriverId,
        license_number: &LicenseNumber,
    ) -> Result<Driver, StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE driver SET license_number = ?1 WHERE id = ?2",
                params![license_number.as_str(), id.get()],
            )?;
            if changed == 0 {
                return Err(StoreError::not_found(ENTITY, id.get()));
            }
            debug!(driver_id = id.get(), "license number updated");
            load_driver(conn, id)
        })
    }

    /// Deletes the driver and their car links; the cars stay.
    pub fn delete_driver(&self, id: DriverId) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM driver WHERE id = ?1", [id.get()])?;
            if changed == 0 {
                return Err(StoreError::not_found(ENTITY, id.get()));
            }
            debug!(driver_id = id.get(), "driver deleted");
            Ok(())
        })
    }

    pub fn list_drivers(&self, page: PageRequest) -> Result<Page<Driver>, StoreError> {
        self.with_conn(|conn| {
            fetch_page(
                conn,
                "SELECT COUNT(*) FROM driver",
                &format!("SELECT {DRIVER_COLUMNS} FROM driver d ORDER BY d.id"),
                Vec::new(),
                page,
                |row| driver_at(row, 0),
            )
        })
    }

    /// Every driver ordered by username, as the car form's choices need them.
    pub fn all_drivers(&self) -> Result<Vec<Driver>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {DRIVER_COLUMNS} FROM driver d ORDER BY d.username"
            ))?;
            let rows = stmt
                .query_map([], |row| driver_at(row, 0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Creates the staff account unless the username is already taken.
    ///
    /// Returns `true` when a new account was written.
    pub fn ensure_staff_account(&self, input: &NewDriver) -> Result<bool, StoreError> {
        if self.find_driver_by_username(input.username().as_str())?.is_some() {
            return Ok(false);
        }
        self.register_driver(&input.clone().with_staff(true))?;
        Ok(true)
    }
}

fn load_driver(conn: &Connection, id: DriverId) -> Result<Driver, StoreError> {
    conn.query_row(
        &format!("SELECT {DRIVER_COLUMNS} FROM driver d WHERE d.id = ?1"),
        [id.get()],
        |row| driver_at(row, 0),
    )
    .optional()?
    .ok_or(StoreError::not_found(ENTITY, id.get()))
}
