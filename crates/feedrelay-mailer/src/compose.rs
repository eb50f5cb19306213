// SPDX-FileCopyrightText: 2026 Feedrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound message composition.
//!
//! The forwarded email presents the requester as the effective author: the
//! `From` display name is "<requester mailbox> via" over the configured
//! sender address, and `Reply-To` is the requester, so replying from the
//! recipient's mail client reaches them directly.

use feedrelay_core::FeedrelayError;
use feedrelay_core::types::{EmailAttachment, FeedbackRecord, Mailbox, OutboundEmail, UploadRecord};

/// Compose the forwarded email for a finalized feedback record.
///
/// One attachment is built per non-placeholder upload, with the MIME type
/// inferred from the filename (empty when inference fails). Subject and body
/// are copied verbatim.
pub fn compose(
    record: &FeedbackRecord,
    uploads: &[UploadRecord],
    sender: &str,
    recipient: &str,
) -> Result<OutboundEmail, FeedrelayError> {
    let subject = record.subject.as_deref().filter(|s| !s.is_empty());
    let body = record.message.as_deref().filter(|s| !s.is_empty());
    let (Some(subject), Some(body)) = (subject, body) else {
        return Err(FeedrelayError::Validation(format!(
            "feedback record {} is not finalized",
            record.id
        )));
    };

    let reply_to = match record.name.as_deref().filter(|n| !n.is_empty()) {
        Some(name) => Mailbox::named(name, &record.email),
        None => Mailbox::new(&record.email),
    };
    let from = Mailbox::named(&format!("{reply_to} via"), sender);

    let attachments = uploads
        .iter()
        .filter(|u| !u.ignored)
        .map(|u| EmailAttachment {
            filename: u.filename.clone(),
            content_type: mime_guess::from_path(&u.filename)
                .first_raw()
                .unwrap_or_default()
                .to_string(),
            data: u.data.clone(),
        })
        .collect();

    Ok(OutboundEmail {
        from,
        reply_to,
        to: Mailbox::new(recipient),
        subject: subject.to_string(),
        body: body.to_string(),
        attachments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(name: Option<&str>) -> FeedbackRecord {
        FeedbackRecord {
            id: "rec-1".into(),
            email: "ann@example.com".into(),
            client_ip: "".into(),
            created_at: Utc::now(),
            subject: Some("Bug".into()),
            message: Some("Crashes".into()),
            name: name.map(str::to_string),
            has_uploads: true,
            archived_at: None,
            external_message_id: None,
        }
    }

    fn upload(id: i64, filename: &str, ignored: bool) -> UploadRecord {
        UploadRecord {
            id,
            feedback_id: "rec-1".into(),
            filename: filename.into(),
            data: vec![1, 2, 3],
            content_length: 3,
            ignored,
        }
    }

    #[test]
    fn requester_becomes_reply_to_and_via_sender() {
        let email = compose(&record(Some("Ann")), &[], "relay@example.com", "support@example.com")
            .unwrap();

        assert_eq!(email.reply_to.to_string(), "Ann <ann@example.com>");
        assert_eq!(email.from.address, "relay@example.com");
        assert_eq!(
            email.from.name.as_deref(),
            Some("Ann <ann@example.com> via")
        );
        assert_eq!(email.to.address, "support@example.com");
        assert_eq!(email.subject, "Bug");
        assert_eq!(email.body, "Crashes");
    }

    #[test]
    fn nameless_requester_uses_bare_address() {
        let email = compose(&record(None), &[], "relay@example.com", "support@example.com")
            .unwrap();
        assert_eq!(email.reply_to.to_string(), "ann@example.com");
        assert_eq!(email.from.name.as_deref(), Some("ann@example.com via"));
    }

    #[test]
    fn placeholders_are_not_attached_and_mime_is_inferred() {
        let uploads = [
            upload(1, "shot.png", false),
            upload(2, "log.txt", false),
            upload(3, "extra.png", true),
            upload(4, "mystery.zzz-unknown", false),
        ];
        let email = compose(&record(None), &uploads, "relay@example.com", "support@example.com")
            .unwrap();

        assert_eq!(email.attachments.len(), 3);
        assert_eq!(email.attachments[0].content_type, "image/png");
        assert_eq!(email.attachments[1].content_type, "text/plain");
        // Unknown extension: empty type, attachment still included.
        assert_eq!(email.attachments[2].content_type, "");
        assert_eq!(email.attachments[2].filename, "mystery.zzz-unknown");
    }

    #[test]
    fn unfinalized_record_is_rejected() {
        let mut draft = record(None);
        draft.message = None;
        let err = compose(&draft, &[], "relay@example.com", "support@example.com").unwrap_err();
        assert!(matches!(err, FeedrelayError::Validation(_)));
    }
}
