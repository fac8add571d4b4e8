/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use super::{Element, Namespace, sharee::Sharee};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(serde::Serialize))]
pub enum DavProperty {
    WebDav(WebDavProperty),
    Principal(PrincipalProperty),
    Sharing(SharingProperty),
    DeadProperty(Element),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(serde::Serialize))]
pub enum WebDavProperty {
    ResourceType,
    DisplayName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(serde::Serialize))]
pub enum PrincipalProperty {
    EmailAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(serde::Serialize))]
pub enum SharingProperty {
    Invite,
    AllowedSharingModes,
    SharedUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(serde::Serialize))]
pub enum ResourceType {
    Collection,
    Principal,
    Calendar,
    SharedOwner,
    Shared,
    Other(Element),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DavValue {
    ResourceType(Vec<ResourceType>),
    Href(Href),
    Invite(Invite),
    AllowedSharingModes(AllowedSharingModes),
    String(String),
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavPropertyValue {
    pub property: DavProperty,
    pub value: DavValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(serde::Serialize))]
pub struct Href(pub String);

/// Listing of the sharees of a calendar. The organizer is only present
/// when the listing is rendered for a sharee.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Invite {
    pub organizer: Option<OwnerInfo>,
    pub users: Vec<Sharee>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerInfo {
    pub href: String,
    pub common_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedSharingModes {
    pub can_be_shared: bool,
    pub can_be_published: bool,
}

impl DavProperty {
    pub const RESOURCE_TYPE: DavProperty = DavProperty::WebDav(WebDavProperty::ResourceType);
    pub const DISPLAY_NAME: DavProperty = DavProperty::WebDav(WebDavProperty::DisplayName);
    pub const EMAIL_ADDRESS: DavProperty =
        DavProperty::Principal(PrincipalProperty::EmailAddress);
    pub const INVITE: DavProperty = DavProperty::Sharing(SharingProperty::Invite);
    pub const ALLOWED_SHARING_MODES: DavProperty =
        DavProperty::Sharing(SharingProperty::AllowedSharingModes);
    pub const SHARED_URL: DavProperty = DavProperty::Sharing(SharingProperty::SharedUrl);

    pub fn namespace(&self) -> &Namespace {
        match self {
            DavProperty::WebDav(_) => &Namespace::Dav,
            DavProperty::Principal(_) => &Namespace::Sabre,
            DavProperty::Sharing(_) => &Namespace::CalendarServer,
            DavProperty::DeadProperty(element) => &element.namespace,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DavProperty::WebDav(WebDavProperty::ResourceType) => "resourcetype",
            DavProperty::WebDav(WebDavProperty::DisplayName) => "displayname",
            DavProperty::Principal(PrincipalProperty::EmailAddress) => "email-address",
            DavProperty::Sharing(SharingProperty::Invite) => "invite",
            DavProperty::Sharing(SharingProperty::AllowedSharingModes) => {
                "allowed-sharing-modes"
            }
            DavProperty::Sharing(SharingProperty::SharedUrl) => "shared-url",
            DavProperty::DeadProperty(element) => &element.name,
        }
    }
}

impl std::fmt::Display for DavProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}{}", self.namespace().uri(), self.name())
    }
}

impl ResourceType {
    pub fn namespace(&self) -> &Namespace {
        match self {
            ResourceType::Collection | ResourceType::Principal => &Namespace::Dav,
            ResourceType::Calendar => &Namespace::CalDav,
            ResourceType::SharedOwner | ResourceType::Shared => &Namespace::CalendarServer,
            ResourceType::Other(element) => &element.namespace,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResourceType::Collection => "collection",
            ResourceType::Principal => "principal",
            ResourceType::Calendar => "calendar",
            ResourceType::SharedOwner => "shared-owner",
            ResourceType::Shared => "shared",
            ResourceType::Other(element) => &element.name,
        }
    }
}

impl DavValue {
    pub fn has_resource_type(&self, resource_type: &ResourceType) -> bool {
        matches!(self, DavValue::ResourceType(types) if types.contains(resource_type))
    }

    /// Appends a resource type label, returns `false` when the value is not a
    /// resource type list or already carries the label.
    pub fn add_resource_type(&mut self, resource_type: ResourceType) -> bool {
        match self {
            DavValue::ResourceType(types) if !types.contains(&resource_type) => {
                types.push(resource_type);
                true
            }
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DavValue::String(value) => Some(value.as_str()),
            DavValue::Href(href) => Some(href.0.as_str()),
            _ => None,
        }
    }
}

impl DavPropertyValue {
    pub fn new(property: impl Into<DavProperty>, value: impl Into<DavValue>) -> Self {
        DavPropertyValue {
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn empty(property: impl Into<DavProperty>) -> Self {
        DavPropertyValue {
            property: property.into(),
            value: DavValue::Null,
        }
    }
}

impl Invite {
    pub fn new(users: Vec<Sharee>) -> Self {
        Invite {
            organizer: None,
            users,
        }
    }

    pub fn with_organizer(mut self, organizer: OwnerInfo) -> Self {
        self.organizer = Some(organizer);
        self
    }
}

impl OwnerInfo {
    pub fn new(href: impl Into<String>) -> Self {
        OwnerInfo {
            href: href.into(),
            common_name: None,
        }
    }
}

impl AllowedSharingModes {
    pub fn new(can_be_shared: bool, can_be_published: bool) -> Self {
        AllowedSharingModes {
            can_be_shared,
            can_be_published,
        }
    }
}

impl From<WebDavProperty> for DavProperty {
    fn from(value: WebDavProperty) -> Self {
        DavProperty::WebDav(value)
    }
}

impl From<SharingProperty> for DavProperty {
    fn from(value: SharingProperty) -> Self {
        DavProperty::Sharing(value)
    }
}

impl From<Vec<ResourceType>> for DavValue {
    fn from(value: Vec<ResourceType>) -> Self {
        DavValue::ResourceType(value)
    }
}

impl From<Href> for DavValue {
    fn from(value: Href) -> Self {
        DavValue::Href(value)
    }
}

impl From<Invite> for DavValue {
    fn from(value: Invite) -> Self {
        DavValue::Invite(value)
    }
}

impl From<AllowedSharingModes> for DavValue {
    fn from(value: AllowedSharingModes) -> Self {
        DavValue::AllowedSharingModes(value)
    }
}

impl From<String> for DavValue {
    fn from(value: String) -> Self {
        DavValue::String(value)
    }
}

impl From<&str> for DavValue {
    fn from(value: &str) -> Self {
        DavValue::String(value.to_string())
    }
}
