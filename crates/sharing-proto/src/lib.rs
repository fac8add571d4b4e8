/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

pub mod parser;
pub mod responses;
pub mod schema;

pub use schema::{Depth, Element, Namespace, NamespaceTable, Privilege};
