/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use super::{Text, XmlEscape};
use crate::schema::{Namespace, response::SharedAs};
use std::fmt::Display;

impl Display for SharedAs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (calendar_server, dav) = (Namespace::CalendarServer, Namespace::Dav);
        let mut missing = Vec::new();
        let cs = self.prefix_for(&calendar_server, &mut missing);
        let d = self.prefix_for(&dav, &mut missing);

        write!(f, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        write!(f, "<{cs}:shared-as")?;
        for (uri, prefix) in self
            .namespaces
            .iter()
            .chain(missing.iter().map(|(uri, prefix)| (*uri, prefix.as_str())))
        {
            write!(f, " xmlns:{prefix}=\"")?;
            uri.write_escaped_to(f)?;
            f.write_str("\"")?;
        }
        write!(
            f,
            "><{d}:href>{}</{d}:href></{cs}:shared-as>",
            Text(self.href)
        )
    }
}

impl SharedAs<'_> {
    /// Prefix bound to `namespace` by the table. Namespaces the table lacks
    /// get a prefix no other declaration uses and are queued in `missing`.
    fn prefix_for<'y>(
        &self,
        namespace: &'y Namespace,
        missing: &mut Vec<(&'y str, String)>,
    ) -> String {
        if let Some(prefix) = self.namespaces.prefix(namespace) {
            return prefix.to_string();
        }

        let base = namespace.prefix().unwrap_or("X");
        let mut prefix = base.to_string();
        let mut suffix = 0;
        while self.namespaces.iter().any(|(_, p)| p == prefix)
            || missing.iter().any(|(_, p)| *p == prefix)
        {
            suffix += 1;
            prefix = format!("{base}{suffix}");
        }
        missing.push((namespace.uri(), prefix.clone()));
        prefix
    }
}
