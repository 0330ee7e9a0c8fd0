// SPDX-License-Identifier: Apache-2.0

use crate::validate::{ValidationError, ValidationReason};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

macro_rules! entity_id {
    ($name:ident, $field:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }

            /// Parses a positive decimal row id, as found in a route segment.
            pub fn parse(input: &str) -> Result<Self, ValidationError> {
                match input.trim().parse::<i64>() {
                    Ok(raw) if raw > 0 => Ok(Self(raw)),
                    _ => Err(ValidationError::new(
                        $field,
                        ValidationReason::InvalidCharacters,
                    )),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(ManufacturerId, "manufacturer");
entity_id!(CarId, "car");
entity_id!(DriverId, "driver");
