/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::{
    SharingPlugin,
    host::{DavContext, DavNode},
};
use hyper::StatusCode;
use sharing_proto::{
    Depth,
    schema::{
        property::{
            AllowedSharingModes, DavProperty, DavPropertyValue, Href, Invite, OwnerInfo,
            ResourceType,
        },
        request::ShareUpdate,
        response::PropStatMap,
        sharee::ShareeList,
    },
};
use tracing::debug;

pub(crate) trait PropertyInjector: Sync + Send {
    fn inject_before(
        &self,
        ctx: &DavContext<'_>,
        node: &dyn DavNode,
        requested: &mut Vec<DavProperty>,
        returned: &mut PropStatMap,
    ) -> impl Future<Output = crate::Result<()>> + Send;

    fn inject_after(
        &self,
        node: &dyn DavNode,
        properties: &mut PropStatMap,
    ) -> impl Future<Output = crate::Result<()>> + Send;

    fn intercept_unshare(
        &self,
        node: &dyn DavNode,
        mutations: &mut Vec<DavPropertyValue>,
        result: &mut PropStatMap,
    ) -> impl Future<Output = crate::Result<()>> + Send;
}

impl PropertyInjector for SharingPlugin {
    async fn inject_before(
        &self,
        ctx: &DavContext<'_>,
        node: &dyn DavNode,
        requested: &mut Vec<DavProperty>,
        returned: &mut PropStatMap,
    ) -> crate::Result<()> {
        if let Some(shareable) = node.shareable() {
            if take_property(requested, &DavProperty::INVITE) {
                let shares = shareable.shares().await?;
                returned.insert(
                    StatusCode::OK,
                    DavPropertyValue::new(DavProperty::INVITE, Invite::new(shares)),
                );
            }
        }

        if let Some(shared) = node.shared() {
            if take_property(requested, &DavProperty::SHARED_URL) {
                returned.insert(
                    StatusCode::OK,
                    DavPropertyValue::new(
                        DavProperty::SHARED_URL,
                        Href(shared.shared_url().to_string()),
                    ),
                );
            }

            if take_property(requested, &DavProperty::INVITE) {
                let organizer = owner_info(ctx, shared.owner()).await?;
                let shares = shared.shares().await?;
                returned.insert(
                    StatusCode::OK,
                    DavPropertyValue::new(
                        DavProperty::INVITE,
                        Invite::new(shares).with_organizer(organizer),
                    ),
                );
            }
        }

        Ok(())
    }

    async fn inject_after(
        &self,
        node: &dyn DavNode,
        properties: &mut PropStatMap,
    ) -> crate::Result<()> {
        let Some(shareable) = node.shareable() else {
            return Ok(());
        };

        if properties.contains(StatusCode::OK, &DavProperty::RESOURCE_TYPE)
            && !shareable.shares().await?.is_empty()
        {
            if let Some(resource_type) =
                properties.get_mut(StatusCode::OK, &DavProperty::RESOURCE_TYPE)
            {
                resource_type.value.add_resource_type(ResourceType::SharedOwner);
            }
        }

        // Fixed, publishing state is not reflected here
        if properties
            .remove(StatusCode::NOT_FOUND, &DavProperty::ALLOWED_SHARING_MODES)
            .is_some()
        {
            properties.insert(
                StatusCode::OK,
                DavPropertyValue::new(
                    DavProperty::ALLOWED_SHARING_MODES,
                    AllowedSharingModes::new(true, false),
                ),
            );
        }

        Ok(())
    }

    async fn intercept_unshare(
        &self,
        node: &dyn DavNode,
        mutations: &mut Vec<DavPropertyValue>,
        result: &mut PropStatMap,
    ) -> crate::Result<()> {
        let Some(shareable) = node.shareable() else {
            return Ok(());
        };
        let Some(idx) = mutations
            .iter()
            .position(|m| m.property == DavProperty::RESOURCE_TYPE)
        else {
            return Ok(());
        };
        if mutations[idx]
            .value
            .has_resource_type(&ResourceType::SharedOwner)
        {
            return Ok(());
        }

        let remove = shareable.shares().await?.hrefs();
        debug!(
            path = node.path(),
            sharees = remove.len(),
            "Unsharing calendar through resourcetype update"
        );
        shareable
            .update_shares(&ShareUpdate::remove_all(remove))
            .await?;

        let mutation = mutations.remove(idx);
        result.insert(StatusCode::OK, DavPropertyValue::empty(mutation.property));

        Ok(())
    }
}

async fn owner_info(ctx: &DavContext<'_>, owner: &str) -> crate::Result<OwnerInfo> {
    let mut info = OwnerInfo::new(owner);
    let response = ctx
        .tree
        .properties_for_path(
            owner,
            &[DavProperty::EMAIL_ADDRESS, DavProperty::DISPLAY_NAME],
            Depth::Zero,
        )
        .await?;

    if let Some(response) = response.first() {
        if let Some(email) = response
            .propstat
            .get(StatusCode::OK, &DavProperty::EMAIL_ADDRESS)
            .and_then(|p| p.value.as_str())
            .filter(|email| !email.is_empty())
        {
            info.href = format!("mailto:{email}");
        }
        info.common_name = response
            .propstat
            .get(StatusCode::OK, &DavProperty::DISPLAY_NAME)
            .and_then(|p| p.value.as_str())
            .filter(|name| !name.is_empty())
            .map(|name| name.to_string());
    }

    Ok(info)
}

fn take_property(requested: &mut Vec<DavProperty>, property: &DavProperty) -> bool {
    let before = requested.len();
    requested.retain(|p| p != property);
    requested.len() != before
}
