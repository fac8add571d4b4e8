/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use super::Text;
use crate::schema::{
    NamespaceTable,
    response::{MultiStatus, PropResponse, PropStat},
};
use std::fmt::Display;

impl Display for MultiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        write!(f, "<D:multistatus {}>", NamespaceTable::default())?;
        for response in &self.responses {
            response.fmt(f)?;
        }
        write!(f, "</D:multistatus>")
    }
}

impl Display for PropResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<D:response><D:href>{}</D:href>", Text(&self.href))?;
        for propstat in self.propstat.iter() {
            propstat.fmt(f)?;
        }
        write!(f, "</D:response>")
    }
}

impl Display for PropStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<D:propstat><D:prop>")?;
        for property in &self.properties {
            property.fmt(f)?;
        }
        write!(
            f,
            "</D:prop><D:status>HTTP/1.1 {} {}</D:status></D:propstat>",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or_default()
        )
    }
}
