/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use super::{PROP, PROPSTAT, SharingTest, reply_document, share_document, store::WORK};
use hyper::StatusCode;
use sharing_proto::schema::property::{
    DavProperty, DavPropertyValue, DavValue, ResourceType,
};

pub async fn test(handle: &SharingTest) {
    println!("Running legacy unshare tests...");
    handle.reset();
    let john = handle.client("john");
    let jane = handle.client("jane");

    john.post(
        WORK,
        share_document(
            &[("mailto:jane@example.com", true), ("/principals/bill", false)],
            &[],
        ),
    )
    .await
    .with_status(StatusCode::OK);
    jane.post(
        "/calendars/jane/",
        reply_document(
            "mailto:jane@example.com",
            "invite-accepted",
            Some(WORK),
            "inv-john-work",
        ),
    )
    .await
    .with_status(StatusCode::OK);
    john.propfind(WORK, [DavProperty::RESOURCE_TYPE])
        .await
        .with_key(format!("{PROP}.D:resourcetype.C:shared-owner"));

    // Keeping shared-owner leaves the update to the core, which refuses it
    john.proppatch(
        WORK,
        vec![DavPropertyValue::new(
            DavProperty::RESOURCE_TYPE,
            vec![
                ResourceType::Collection,
                ResourceType::Calendar,
                ResourceType::SharedOwner,
            ],
        )],
    )
    .await
    .with_status(StatusCode::MULTI_STATUS)
    .with_values(format!("{PROPSTAT}.D:status"), ["HTTP/1.1 403 Forbidden"]);
    assert_eq!(handle.server.sharees(WORK).len(), 2);

    // Dropping shared-owner unshares the calendar
    john.proppatch(
        WORK,
        vec![
            DavPropertyValue::new(
                DavProperty::RESOURCE_TYPE,
                vec![ResourceType::Collection, ResourceType::Calendar],
            ),
            DavPropertyValue::new(DavProperty::DISPLAY_NAME, "Work"),
        ],
    )
    .await
    .with_status(StatusCode::MULTI_STATUS)
    .with_values(format!("{PROPSTAT}.D:status"), ["HTTP/1.1 200 OK"])
    .with_value(format!("{PROP}.D:resourcetype"), "")
    .with_value(format!("{PROP}.D:displayname"), "");
    assert!(handle.server.sharees(WORK).is_empty());
    assert!(handle.server.shared_instances("/principals/jane").is_empty());
    assert_eq!(
        handle
            .server
            .dead_property(WORK, &DavProperty::RESOURCE_TYPE),
        None
    );
    assert_eq!(
        handle
            .server
            .dead_property(WORK, &DavProperty::DISPLAY_NAME),
        Some(DavValue::String("Work".to_string()))
    );
    john.propfind(WORK, [DavProperty::RESOURCE_TYPE, DavProperty::INVITE])
        .await
        .without_key(format!("{PROP}.D:resourcetype.C:shared-owner"))
        .with_value(format!("{PROP}.C:invite"), "");
    jane.propfind("/calendars/jane/work-john/", [DavProperty::INVITE])
        .await
        .with_status(StatusCode::NOT_FOUND);

    // Unsharing an unshared calendar succeeds
    john.proppatch(
        WORK,
        vec![DavPropertyValue::new(
            DavProperty::RESOURCE_TYPE,
            vec![ResourceType::Collection],
        )],
    )
    .await
    .with_values(format!("{PROPSTAT}.D:status"), ["HTTP/1.1 200 OK"]);

    // Resources that cannot be shared are left to the core
    john.proppatch(
        "/calendars/john/",
        vec![DavPropertyValue::new(
            DavProperty::RESOURCE_TYPE,
            vec![ResourceType::Collection],
        )],
    )
    .await
    .with_values(format!("{PROPSTAT}.D:status"), ["HTTP/1.1 403 Forbidden"]);
    handle.assert_fallback_untouched();
}
