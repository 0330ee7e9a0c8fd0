// SPDX-License-Identifier: Apache-2.0

pub(crate) mod accounts;
pub(crate) mod admin;
pub(crate) mod cars;
pub(crate) mod drivers;
pub(crate) mod handlers_utilities;
pub(crate) mod manufacturers;
