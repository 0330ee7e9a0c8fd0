// SPDX-License-Identifier: Apache-2.0

//! Staff-only model registry: which models the admin surface exposes and how
//! their changelists are shaped.

use serde::Serialize;

pub const ADMIN_APP_LABEL: &str = "taxi";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fieldset {
    pub name: Option<&'static str>,
    pub fields: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelAdmin {
    pub model: &'static str,
    pub verbose_name_plural: &'static str,
    pub list_display: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    pub fieldsets: &'static [Fieldset],
}

impl ModelAdmin {
    #[must_use]
    pub fn changelist_path(&self) -> String {
        format!("/admin/{ADMIN_APP_LABEL}/{}/", self.model)
    }

    #[must_use]
    pub fn searchable(&self) -> bool {
        !self.search_fields.is_empty()
    }

    #[must_use]
    pub fn filters_on(&self, field: &str) -> bool {
        self.list_filter.iter().any(|f| *f == field)
    }
}

const ACCOUNT_FIELDSETS: [Fieldset; 4] = [
    Fieldset {
        name: None,
        fields: &["username", "password"],
    },
    Fieldset {
        name: Some("Personal info"),
        fields: &["first_name", "last_name", "email"],
    },
    Fieldset {
        name: Some("Permissions"),
        fields: &["is_active", "is_staff"],
    },
    Fieldset {
        name: Some("Important dates"),
        fields: &["date_joined"],
    },
];

const DRIVER_FIELDSETS: [Fieldset; 5] = [
    ACCOUNT_FIELDSETS[0],
    ACCOUNT_FIELDSETS[1],
    ACCOUNT_FIELDSETS[2],
    ACCOUNT_FIELDSETS[3],
    Fieldset {
        name: Some("Additional info"),
        fields: &["license_number"],
    },
];

pub const MANUFACTURER_ADMIN: ModelAdmin = ModelAdmin {
    model: "manufacturer",
    verbose_name_plural: "manufacturers",
    list_display: &["id", "name", "country"],
    search_fields: &[],
    list_filter: &[],
    fieldsets: &[Fieldset {
        name: None,
        fields: &["name", "country"],
    }],
};

pub const CAR_ADMIN: ModelAdmin = ModelAdmin {
    model: "car",
    verbose_name_plural: "cars",
    list_display: &["id", "model", "manufacturer"],
    search_fields: &["model"],
    list_filter: &["manufacturer"],
    fieldsets: &[Fieldset {
        name: None,
        fields: &["model", "manufacturer", "drivers"],
    }],
};

pub const DRIVER_ADMIN: ModelAdmin = ModelAdmin {
    model: "driver",
    verbose_name_plural: "drivers",
    list_display: &[
        "username",
        "email",
        "first_name",
        "last_name",
        "is_staff",
        "license_number",
    ],
    search_fields: &[],
    list_filter: &[],
    fieldsets: &DRIVER_FIELDSETS,
};

/// Registered models in the order the admin index lists them.
pub static REGISTRY: [ModelAdmin; 3] = [CAR_ADMIN, DRIVER_ADMIN, MANUFACTURER_ADMIN];

#[must_use]
pub fn lookup(model: &str) -> Option<&'static ModelAdmin> {
    REGISTRY.iter().find(|admin| admin.model == model)
}

/// Keeps only the `list_display` columns of a serialized row.
#[must_use]
pub fn project_row(admin: &ModelAdmin, row: &serde_json::Value) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    for column in admin.list_display {
        if let Some(value) = row.get(*column) {
            out.insert((*column).to_string(), value.clone());
        }
    }
    serde_json::Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn driver_admin_shows_license_number() {
        let admin = lookup("driver").expect("driver registered");
        assert!(admin.list_display.contains(&"license_number"));
        let extra = admin.fieldsets.last().expect("fieldsets");
        assert_eq!(extra.name, Some("Additional info"));
        assert_eq!(extra.fields, &["license_number"]);
    }

    #[test]
    fn car_admin_searches_model_and_filters_manufacturer() {
        let admin = lookup("car").expect("car registered");
        assert!(admin.searchable());
        assert!(admin.filters_on("manufacturer"));
        assert!(!lookup("manufacturer").expect("registered").searchable());
        assert!(lookup("passenger").is_none());
        assert_eq!(admin.changelist_path(), "/admin/taxi/car/");
    }

    #[test]
    fn rows_are_projected_onto_list_display() {
        let row = json!({"id": 1, "name": "Toyota", "country": "Japan", "display": "Toyota Japan"});
        assert_eq!(
            project_row(&MANUFACTURER_ADMIN, &row),
            json!({"id": 1, "name": "Toyota", "country": "Japan"})
        );
    }
}
