/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use super::{
    PROP, SharingTest, reply_document, share_document,
    store::{NOTES, PERSONAL, WORK},
};
use hyper::StatusCode;
use sharing_proto::schema::{property::DavProperty, sharee::ShareeStatus};

pub async fn test(handle: &SharingTest) {
    println!("Running invite reply tests...");
    handle.reset();
    let john = handle.client("john");
    let jane = handle.client("jane");
    let bill = handle.client("bill");

    john.post(
        WORK,
        share_document(
            &[("mailto:jane@example.com", true), ("/principals/bill", false)],
            &[],
        ),
    )
    .await
    .with_status(StatusCode::OK);

    // Accepting materializes the calendar in the sharee's home
    for _ in 0..2 {
        let response = jane
            .post(
                "/calendars/jane/",
                reply_document(
                    "mailto:jane@example.com",
                    "invite-accepted",
                    Some(WORK),
                    "inv-john-work",
                ),
            )
            .await
            .with_status(StatusCode::OK)
            .with_header("x-sabre-status", "everything-went-well")
            .with_header("content-type", "application/xml")
            .with_transaction(Some("post-invite-reply"))
            .with_value("C:shared-as.D:href", "/calendars/jane/work-john/");
        assert!(
            response
                .body
                .contains("xmlns:S=\"http://sabredav.org/ns\""),
            "{}",
            response.body
        );
    }
    assert_eq!(
        handle.server.shared_instances("/principals/jane"),
        ["/calendars/jane/work-john/"]
    );
    handle.assert_fallback_untouched();

    // The owner sees the new status
    john.propfind(WORK, [DavProperty::INVITE])
        .await
        .with_key_count(format!("{PROP}.C:invite.C:user.C:invite-accepted"), 1)
        .with_key_count(format!("{PROP}.C:invite.C:user.C:invite-noresponse"), 1)
        .without_key(format!("{PROP}.C:invite.C:organizer.D:href"));

    // The sharee sees the organizer and the owner's calendar
    jane.propfind(
        "/calendars/jane/work-john/",
        [
            DavProperty::RESOURCE_TYPE,
            DavProperty::SHARED_URL,
            DavProperty::INVITE,
        ],
    )
    .await
    .with_status(StatusCode::MULTI_STATUS)
    .with_values(format!("{PROP}.D:resourcetype.C:shared"), [""])
    .without_key(format!("{PROP}.D:resourcetype.C:shared-owner"))
    .with_value(format!("{PROP}.C:shared-url.D:href"), WORK)
    .with_value(
        format!("{PROP}.C:invite.C:organizer.D:href"),
        "mailto:john@example.com",
    )
    .with_value(
        format!("{PROP}.C:invite.C:organizer.C:common-name"),
        "John Doe",
    )
    .with_values(
        format!("{PROP}.C:invite.C:user.D:href"),
        ["mailto:jane@example.com", "/principals/bill"],
    );

    // Declining through the invitation id removes the shared calendar
    jane.post(
        "/calendars/jane/",
        reply_document(
            "mailto:jane@example.com",
            "invite-declined",
            None,
            "inv-john-work",
        ),
    )
    .await
    .with_status(StatusCode::OK)
    .with_header("x-sabre-status", "everything-went-well")
    .with_no_header("content-type")
    .with_empty_body();
    assert!(handle.server.shared_instances("/principals/jane").is_empty());
    assert_eq!(
        handle.server.sharees(WORK)[0].status,
        ShareeStatus::Declined
    );
    jane.propfind("/calendars/jane/work-john/", [DavProperty::INVITE])
        .await
        .with_status(StatusCode::NOT_FOUND);

    // Declined invitations can be accepted later
    jane.post(
        "/calendars/jane/",
        reply_document(
            "mailto:jane@example.com",
            "invite-accepted",
            None,
            "inv-john-work",
        ),
    )
    .await
    .with_status(StatusCode::OK)
    .with_value("C:shared-as.D:href", "/calendars/jane/work-john/");

    // A reply must carry a reply status
    jane.post(
        "/calendars/jane/",
        reply_document(
            "mailto:jane@example.com",
            "invite-noresponse",
            Some(WORK),
            "inv-john-work",
        ),
    )
    .await
    .with_status(StatusCode::BAD_REQUEST)
    .with_no_header("x-sabre-status");

    // Replies are only accepted by calendar homes
    let body = reply_document(
        "mailto:jane@example.com",
        "invite-declined",
        Some(WORK),
        "inv-john-work",
    );
    jane.post("/calendars/jane/home/", body.as_str())
        .await
        .with_header("x-body-recorder", "consumed")
        .with_transaction(None);
    handle.assert_fallback_received(&body);
    assert_eq!(
        handle.server.sharees(WORK)[0].status,
        ShareeStatus::Accepted
    );

    // Replying from someone else's home
    jane.post("/calendars/john/", body.as_str())
        .await
        .with_status(StatusCode::FORBIDDEN)
        .with_transaction(Some("post-invite-reply"));
    bill.post("/calendars/bill/", body.as_str())
        .await
        .with_status(StatusCode::FORBIDDEN);
    assert_eq!(
        handle.server.sharees(WORK)[0].status,
        ShareeStatus::Accepted
    );

    // Unknown invitations
    jane.post(
        "/calendars/jane/",
        reply_document(
            "mailto:jane@example.com",
            "invite-accepted",
            None,
            "inv-unknown",
        ),
    )
    .await
    .with_status(StatusCode::NOT_FOUND);
    jane.post(
        "/calendars/jane/",
        reply_document(
            "mailto:jane@example.com",
            "invite-accepted",
            Some(PERSONAL),
            "inv-john-personal",
        ),
    )
    .await
    .with_status(StatusCode::FORBIDDEN);

    // Invalid sharees cannot reply
    john.post(
        PERSONAL,
        share_document(&[("mailto:jane@example.com", false)], &[]),
    )
    .await
    .with_status(StatusCode::OK);
    handle
        .server
        .set_sharee_status(PERSONAL, "mailto:jane@example.com", ShareeStatus::Invalid);
    jane.post(
        "/calendars/jane/",
        reply_document(
            "mailto:jane@example.com",
            "invite-accepted",
            Some(PERSONAL),
            "inv-john-personal",
        ),
    )
    .await
    .with_status(StatusCode::CONFLICT);
    assert_eq!(
        handle.server.shared_instances("/principals/jane"),
        ["/calendars/jane/work-john/"]
    );

    // Owners without contact details are listed by principal path
    bill.post(NOTES, share_document(&[("mailto:jane@example.com", false)], &[]))
        .await
        .with_status(StatusCode::OK);
    jane.post(
        "/calendars/jane/",
        reply_document(
            "mailto:jane@example.com",
            "invite-accepted",
            Some(NOTES),
            "inv-bill-notes",
        ),
    )
    .await
    .with_status(StatusCode::OK)
    .with_value("C:shared-as.D:href", "/calendars/jane/notes-bill/");
    jane.propfind("/calendars/jane/notes-bill/", [DavProperty::INVITE])
        .await
        .with_value(format!("{PROP}.C:invite.C:organizer.D:href"), "/principals/bill")
        .without_key(format!("{PROP}.C:invite.C:organizer.C:common-name"))
        .with_key_count(format!("{PROP}.C:invite.C:user.C:invite-accepted"), 1);

    // Removing an accepted sharee drops the shared calendar
    bill.post(NOTES, share_document(&[], &["mailto:jane@example.com"]))
        .await
        .with_status(StatusCode::OK);
    assert_eq!(
        handle.server.shared_instances("/principals/jane"),
        ["/calendars/jane/work-john/"]
    );
    handle.assert_fallback_untouched();
}
