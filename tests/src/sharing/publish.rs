/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use super::{
    PROP, PUBLISH, SharingTest, UNPUBLISH, reply_document, share_document,
    store::{PERSONAL, WORK},
};
use hyper::StatusCode;
use sharing_proto::schema::property::DavProperty;

pub async fn test(handle: &SharingTest) {
    println!("Running calendar publishing tests...");
    handle.reset();
    let john = handle.client("john");
    let jane = handle.client("jane");

    john.post(WORK, PUBLISH)
        .await
        .with_status(StatusCode::ACCEPTED)
        .with_header("x-sabre-status", "everything-went-well")
        .with_transaction(Some("post-publish-calendar"))
        .with_empty_body();
    assert!(handle.server.is_published(WORK));
    assert!(!handle.server.is_published(PERSONAL));

    // Publishing is not advertised
    john.propfind(WORK, [DavProperty::ALLOWED_SHARING_MODES])
        .await
        .with_key(format!("{PROP}.C:allowed-sharing-modes.C:can-be-shared"))
        .without_key(format!("{PROP}.C:allowed-sharing-modes.C:can-be-published"));

    // Publishing twice is harmless
    john.post(WORK, PUBLISH)
        .await
        .with_status(StatusCode::ACCEPTED);
    assert!(handle.server.is_published(WORK));

    john.post(WORK, UNPUBLISH)
        .await
        .with_status(StatusCode::OK)
        .with_header("x-sabre-status", "everything-went-well")
        .with_transaction(Some("post-unpublish-calendar"))
        .with_empty_body();
    assert!(!handle.server.is_published(WORK));

    // Only the owner may publish
    jane.post(WORK, PUBLISH)
        .await
        .with_status(StatusCode::FORBIDDEN)
        .with_transaction(Some("post-publish-calendar"));
    assert!(!handle.server.is_published(WORK));
    handle.assert_fallback_untouched();

    // Shared instances and principals cannot be published
    john.post(
        WORK,
        share_document(&[("mailto:jane@example.com", true)], &[]),
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
    for uri in ["/calendars/jane/work-john/", "/principals/john"] {
        jane.post(uri, PUBLISH)
            .await
            .with_header("x-body-recorder", "consumed")
            .with_no_header("x-sabre-status")
            .with_transaction(None);
        handle.assert_fallback_received(PUBLISH);
    }
    assert!(!handle.server.is_published(WORK));
}
