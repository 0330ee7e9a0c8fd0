// SPDX-License-Identifier: Apache-2.0

use crate::StoreError;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;

pub const PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    Number(usize),
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub selector: PageSelector,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::number(1)
    }
}

impl PageRequest {
    #[must_use]
    pub const fn number(number: usize) -> Self {
        Self {
            selector: PageSelector::Number(number),
            page_size: PAGE_SIZE,
        }
    }

    #[must_use]
    pub const fn last() -> Self {
        Self {
            selector: PageSelector::Last,
            page_size: PAGE_SIZE,
        }
    }

    /// Resolves the 1-based page number for `total` rows.
    ///
    /// An empty result still has page 1; any page past the end is not found.
    pub fn resolve(&self, total: u64) -> Result<(usize, usize), StoreError> {
        let size = self.page_size.max(1);
        let num_pages = (usize::try_from(total).unwrap_or(usize::MAX).div_ceil(size)).max(1);
        let number = match self.selector {
            PageSelector::Last => num_pages,
            PageSelector::Number(n) => n,
        };
        if number == 0 || number > num_pages {
            return Err(StoreError::not_found(
                "page",
                i64::try_from(number).unwrap_or(i64::MAX),
            ));
        }
        Ok((number, num_pages))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub page_size: usize,
    pub total_items: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            page_size: self.page_size,
            total_items: self.total_items,
        }
    }
}

/// Counts with `count_sql`, then fetches one window of `select_sql`.
///
/// `select_sql` must end right before `LIMIT`; both queries share `params`.
pub(crate) fn fetch_page<T>(
    conn: &Connection,
    count_sql: &str,
    select_sql: &str,
    params: Vec<Value>,
    request: PageRequest,
    decode: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Page<T>, StoreError> {
    let total: i64 = conn.query_row(count_sql, params_from_iter(params.iter()), |row| row.get(0))?;
    let total = u64::try_from(total).unwrap_or(0);
    let (number, num_pages) = request.resolve(total)?;
    let size = request.page_size.max(1);
    let mut windowed = params;
    windowed.push(Value::Integer(i64::try_from(size).unwrap_or(i64::MAX)));
    windowed.push(Value::Integer(
        i64::try_from((number - 1) * size).unwrap_or(i64::MAX),
    ));
    let sql = format!("{select_sql} LIMIT ? OFFSET ?");
    let mut stmt = conn.prepare_cached(&sql)?;
    let items = stmt
        .query_map(params_from_iter(windowed.iter()), decode)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page {
        items,
        number,
        num_pages,
        page_size: size,
        total_items: total,
    })
}
