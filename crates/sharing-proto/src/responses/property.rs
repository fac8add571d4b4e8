/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use super::{Tag, Text, XmlEscape};
use crate::schema::{
    property::{
        AllowedSharingModes, DavPropertyValue, DavValue, Href, Invite, OwnerInfo, ResourceType,
    },
    sharee::Sharee,
};
use std::fmt::Display;

impl Display for DavPropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = Tag::new(self.property.namespace(), self.property.name());
        if matches!(self.value, DavValue::Null) {
            tag.empty(f)
        } else {
            tag.wrap(f, &self.value)
        }
    }
}

impl Display for DavValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DavValue::ResourceType(types) => {
                for resource_type in types {
                    resource_type.fmt(f)?;
                }
                Ok(())
            }
            DavValue::Href(href) => href.fmt(f),
            DavValue::Invite(invite) => invite.fmt(f),
            DavValue::AllowedSharingModes(modes) => modes.fmt(f),
            DavValue::String(text) => text.write_escaped_to(f),
            DavValue::Null => Ok(()),
        }
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Tag::new(self.namespace(), self.name()).empty(f)
    }
}

impl Display for Href {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<D:href>")?;
        self.0.write_escaped_to(f)?;
        write!(f, "</D:href>")
    }
}

impl Display for Invite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(organizer) = &self.organizer {
            organizer.fmt(f)?;
        }
        for user in &self.users {
            user.fmt(f)?;
        }
        Ok(())
    }
}

impl Display for OwnerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<C:organizer><D:href>{}</D:href>", Text(&self.href))?;
        if let Some(common_name) = &self.common_name {
            write!(f, "<C:common-name>{}</C:common-name>", Text(common_name))?;
        }
        write!(f, "</C:organizer>")
    }
}

impl Display for Sharee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<C:user><D:href>{}</D:href>", Text(&self.href))?;
        if let Some(common_name) = &self.common_name {
            write!(f, "<C:common-name>{}</C:common-name>", Text(common_name))?;
        }
        write!(f, "<C:{}/>", self.status.as_str())?;
        if self.read_write.unwrap_or_default() {
            write!(f, "<C:access><C:read-write/></C:access>")?;
        } else {
            write!(f, "<C:access><C:read/></C:access>")?;
        }
        if let Some(summary) = &self.summary {
            write!(f, "<C:summary>{}</C:summary>", Text(summary))?;
        }
        write!(f, "</C:user>")
    }
}

impl Display for AllowedSharingModes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.can_be_shared {
            write!(f, "<C:can-be-shared/>")?;
        }
        if self.can_be_published {
            write!(f, "<C:can-be-published/>")?;
        }
        Ok(())
    }
}
