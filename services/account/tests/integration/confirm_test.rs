use chrono::Utc;
use uuid::Uuid;

use clickgate_account::domain::types::{CONFIRM_WINDOW_SECS, RECEIVE_MSG, RECEIVE_MSG_ERROR};
use clickgate_account::error::AccountError;
use clickgate_account::usecase::confirm::{ConfirmOtpInput, ConfirmOtpUseCase};

use crate::helpers::{MockNotifier, MockOtpRepo, MockUserPort, test_otp, test_user};

fn usecase(
    users: MockUserPort,
    otps: MockOtpRepo,
    notifier: MockNotifier,
) -> ConfirmOtpUseCase<MockUserPort, MockOtpRepo, MockNotifier> {
    ConfirmOtpUseCase {
        users,
        otps,
        notifier,
    }
}

fn link_input(request_id: Uuid, ts: i64) -> ConfirmOtpInput {
    ConfirmOtpInput {
        request_id: request_id.to_string(),
        ts,
    }
}

#[tokio::test]
async fn should_confirm_and_push_authenticated_event() {
    let user = test_user();
    let otp = test_otp(user.id, 120);
    let ts = otp.expires_at.timestamp();
    let notifier = MockNotifier::new();
    let uc = usecase(
        MockUserPort::new(vec![user.clone()]),
        MockOtpRepo::new(vec![otp.clone()]),
        notifier.clone(),
    );

    let confirmed = uc.execute(link_input(otp.request_id, ts)).await.unwrap();

    assert_eq!(confirmed, user.id);
    let events = notifier.events_handle();
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, user.id);
    assert_eq!(events[0].1.event, RECEIVE_MSG);
    assert_eq!(events[0].1.data, "Authenticated");
}

#[tokio::test]
async fn negative_timestamp_rejects_before_any_lookup() {
    let otps = MockOtpRepo::empty();
    let uc = usecase(MockUserPort::empty(), otps.clone(), MockNotifier::new());

    let err = uc.execute(link_input(Uuid::new_v4(), -1)).await.unwrap_err();

    assert!(matches!(err, AccountError::OtpNotValid));
    assert_eq!(otps.lookup_count(), 0);
}

#[tokio::test]
async fn stale_link_rejects_before_any_lookup() {
    let otps = MockOtpRepo::empty();
    let uc = usecase(MockUserPort::empty(), otps.clone(), MockNotifier::new());

    let ts = Utc::now().timestamp() - CONFIRM_WINDOW_SECS - 5;
    let err = uc.execute(link_input(Uuid::new_v4(), ts)).await.unwrap_err();

    assert!(matches!(err, AccountError::OtpExpired));
    assert_eq!(otps.lookup_count(), 0);
}

#[tokio::test]
async fn unparsable_request_id_rejects_like_unknown() {
    let uc = usecase(
        MockUserPort::empty(),
        MockOtpRepo::empty(),
        MockNotifier::new(),
    );

    let err = uc
        .execute(ConfirmOtpInput {
            request_id: "not-a-uuid".to_owned(),
            ts: Utc::now().timestamp(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::OtpNotValid));
}

#[tokio::test]
async fn unknown_request_id_is_rejected() {
    let uc = usecase(
        MockUserPort::empty(),
        MockOtpRepo::empty(),
        MockNotifier::new(),
    );

    let err = uc
        .execute(link_input(Uuid::new_v4(), Utc::now().timestamp()))
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::OtpNotValid));
}

#[tokio::test]
async fn missing_owner_fails_authentication() {
    let orphan = test_otp(Uuid::new_v4(), 120);
    let ts = orphan.expires_at.timestamp();
    let uc = usecase(
        MockUserPort::empty(),
        MockOtpRepo::new(vec![orphan.clone()]),
        MockNotifier::new(),
    );

    let err = uc.execute(link_input(orphan.request_id, ts)).await.unwrap_err();

    assert!(matches!(err, AccountError::AuthenticationFailed));
}

#[tokio::test]
async fn mismatched_timestamp_is_rejected() {
    let user = test_user();
    let otp = test_otp(user.id, 120);
    let ts = otp.expires_at.timestamp();
    let notifier = MockNotifier::new();
    let uc = usecase(
        MockUserPort::new(vec![user]),
        MockOtpRepo::new(vec![otp.clone()]),
        notifier.clone(),
    );

    // A second off in either direction misses the exact-expiry match.
    for skewed in [ts - 1, ts + 1] {
        let err = uc
            .execute(link_input(otp.request_id, skewed))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::OtpNotValid));
    }
    assert!(notifier.events_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn expired_credential_still_confirms_within_window() {
    // The two time gates are independent: a credential past its own expiry
    // still confirms while the link itself is inside the 1800 s window.
    let user = test_user();
    let otp = test_otp(user.id, -60);
    let ts = otp.expires_at.timestamp();
    let uc = usecase(
        MockUserPort::new(vec![user.clone()]),
        MockOtpRepo::new(vec![otp.clone()]),
        MockNotifier::new(),
    );

    let confirmed = uc.execute(link_input(otp.request_id, ts)).await.unwrap();

    assert_eq!(confirmed, user.id);
}

#[tokio::test]
async fn push_failure_emits_error_event_and_still_succeeds() {
    let user = test_user();
    let otp = test_otp(user.id, 120);
    let ts = otp.expires_at.timestamp();
    let notifier = MockNotifier::broken();
    let uc = usecase(
        MockUserPort::new(vec![user.clone()]),
        MockOtpRepo::new(vec![otp.clone()]),
        notifier.clone(),
    );

    let confirmed = uc.execute(link_input(otp.request_id, ts)).await.unwrap();

    assert_eq!(confirmed, user.id);
    let events = notifier.events_handle();
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].1.event, RECEIVE_MSG_ERROR);
}

#[tokio::test]
async fn repeated_confirmation_succeeds_while_credential_exists() {
    // Confirmation does not consume the row; a second click on the same link
    // goes through again.
    let user = test_user();
    let otp = test_otp(user.id, 120);
    let ts = otp.expires_at.timestamp();
    let notifier = MockNotifier::new();
    let uc = usecase(
        MockUserPort::new(vec![user.clone()]),
        MockOtpRepo::new(vec![otp.clone()]),
        notifier.clone(),
    );

    uc.execute(link_input(otp.request_id, ts)).await.unwrap();
    uc.execute(link_input(otp.request_id, ts)).await.unwrap();

    assert_eq!(notifier.events_handle().lock().unwrap().len(), 2);
}
