// SPDX-License-Identifier: Apache-2.0

use rusqlite::types::Type;
use rusqlite::Row;
use taxi_fleet_model::{
    Account, Car, CarId, CarListing, Driver, DriverId, LicenseNumber, Manufacturer,
    ManufacturerId, Username, ValidationError,
};

pub(crate) const MANUFACTURER_COLUMNS: &str = "m.id, m.name, m.country";
pub(crate) const CAR_COLUMNS: &str = "c.id, c.model, c.manufacturer_id";
pub(crate) const DRIVER_COLUMNS: &str = "d.id, d.username, d.password_hash, d.first_name, \
     d.last_name, d.email, d.is_active, d.is_staff, d.date_joined, d.license_number";

#[cfg(test)]
const MANUFACTURER_WIDTH: usize = 3;
const CAR_WIDTH: usize = 3;

fn invalid_column(idx: usize, err: ValidationError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn manufacturer_at(row: &Row<'_>, base: usize) -> rusqlite::Result<Manufacturer> {
    Ok(Manufacturer {
        id: ManufacturerId::new(row.get(base)?),
        name: row.get(base + 1)?,
        country: row.get(base + 2)?,
    })
}

pub(crate) fn car_at(row: &Row<'_>, base: usize) -> rusqlite::Result<Car> {
    Ok(Car {
        id: CarId::new(row.get(base)?),
        model: row.get(base + 1)?,
        manufacturer_id: ManufacturerId::new(row.get(base + 2)?),
    })
}

/// Decodes `CAR_COLUMNS, MANUFACTURER_COLUMNS` starting at `base`.
pub(crate) fn car_listing_at(row: &Row<'_>, base: usize) -> rusqlite::Result<CarListing> {
    Ok(CarListing {
        car: car_at(row, base)?,
        manufacturer: manufacturer_at(row, base + CAR_WIDTH)?,
    })
}

pub(crate) fn driver_at(row: &Row<'_>, base: usize) -> rusqlite::Result<Driver> {
    let username: String = row.get(base + 1)?;
    let license: String = row.get(base + 9)?;
    let date_joined: i64 = row.get(base + 8)?;
    Ok(Driver {
        id: DriverId::new(row.get(base)?),
        account: Account {
            username: Username::parse(&username).map_err(|e| invalid_column(base + 1, e))?,
            password_hash: row.get(base + 2)?,
            first_name: row.get(base + 3)?,
            last_name: row.get(base + 4)?,
            email: row.get(base + 5)?,
            is_active: row.get(base + 6)?,
            is_staff: row.get(base + 7)?,
            date_joined: u64::try_from(date_joined).unwrap_or(0),
        },
        license_number: LicenseNumber::parse(&license).map_err(|e| invalid_column(base + 9, e))?,
    })
}
