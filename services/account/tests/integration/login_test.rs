use chrono::Utc;
use uuid::Uuid;

use clickgate_account::domain::types::OTP_TTL_SECS;
use clickgate_account::error::AccountError;
use clickgate_account::usecase::login::{IssueOtpInput, IssueOtpUseCase, IssueOutcome};

use crate::helpers::{MockMailer, MockOtpRepo, MockUserPort, TEST_PASSWORD, test_otp, test_user};

const BASE_URL: &str = "https://clickgate.example.com";

fn usecase(
    users: MockUserPort,
    otps: MockOtpRepo,
    mailer: MockMailer,
) -> IssueOtpUseCase<MockUserPort, MockOtpRepo, MockMailer> {
    IssueOtpUseCase {
        users,
        otps,
        mailer,
        base_url: BASE_URL.to_owned(),
    }
}

fn input(email: &str, password: &str) -> IssueOtpInput {
    IssueOtpInput {
        email: email.to_owned(),
        password: password.to_owned(),
    }
}

#[tokio::test]
async fn should_issue_credential_and_send_link() {
    let user = test_user();
    let otps = MockOtpRepo::empty();
    let mailer = MockMailer::new();
    let uc = usecase(
        MockUserPort::new(vec![user.clone()]),
        otps.clone(),
        mailer.clone(),
    );

    let before = Utc::now().timestamp();
    let outcome = uc.execute(input(&user.email, TEST_PASSWORD)).await.unwrap();
    let after = Utc::now().timestamp();

    let IssueOutcome::Issued {
        user: issued_for,
        request_id,
        expires_at,
    } = outcome
    else {
        panic!("expected a fresh issuance");
    };
    assert_eq!(issued_for.id, user.id);

    // Whole-second expiry, three minutes out.
    assert_eq!(expires_at.timestamp_subsec_nanos(), 0);
    let ts = expires_at.timestamp();
    assert!(ts >= before + OTP_TTL_SECS && ts <= after + OTP_TTL_SECS);

    let stored = otps.otps_handle();
    let stored = stored.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].request_id, request_id);
    assert_eq!(stored[0].user_id, user.id);
    assert_eq!(stored[0].expires_at, expires_at);
    assert_eq!(stored[0].secret.len(), 40);

    let sent = mailer.sent_handle();
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, user.email);
    assert_eq!(sent[0].subject, "Your OTP link");
    let link = format!("{BASE_URL}/Account/Otp/{request_id}/{ts}");
    assert!(sent[0].body.contains(&link), "body: {}", sent[0].body);
}

#[tokio::test]
async fn should_skip_issuance_while_credential_pending() {
    let user = test_user();
    let pending = test_otp(user.id, 120);
    let otps = MockOtpRepo::new(vec![pending]);
    let mailer = MockMailer::new();
    let uc = usecase(
        MockUserPort::new(vec![user.clone()]),
        otps.clone(),
        mailer.clone(),
    );

    let outcome = uc.execute(input(&user.email, TEST_PASSWORD)).await.unwrap();

    assert!(matches!(outcome, IssueOutcome::AlreadyPending { .. }));
    assert_eq!(otps.otps_handle().lock().unwrap().len(), 1);
    assert!(mailer.sent_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn expired_credential_does_not_block_reissue() {
    let user = test_user();
    let stale = test_otp(user.id, -60);
    let otps = MockOtpRepo::new(vec![stale]);
    let mailer = MockMailer::new();
    let uc = usecase(
        MockUserPort::new(vec![user.clone()]),
        otps.clone(),
        mailer.clone(),
    );

    let outcome = uc.execute(input(&user.email, TEST_PASSWORD)).await.unwrap();

    assert!(matches!(outcome, IssueOutcome::Issued { .. }));
    // Issuance does not sweep; the stale row stays next to the fresh one.
    assert_eq!(otps.otps_handle().lock().unwrap().len(), 2);
    assert_eq!(mailer.sent_handle().lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_wrong_password_without_side_effects() {
    let user = test_user();
    let otps = MockOtpRepo::empty();
    let mailer = MockMailer::new();
    let uc = usecase(
        MockUserPort::new(vec![user.clone()]),
        otps.clone(),
        mailer.clone(),
    );

    let err = uc
        .execute(input(&user.email, "not the password"))
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::InvalidLogin));
    assert!(otps.otps_handle().lock().unwrap().is_empty());
    assert!(mailer.sent_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_unknown_email_without_touching_store() {
    let otps = MockOtpRepo::empty();
    let mailer = MockMailer::new();
    let uc = usecase(MockUserPort::empty(), otps.clone(), mailer.clone());

    let err = uc
        .execute(input("nobody@example.com", TEST_PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::InvalidLogin));
    assert_eq!(otps.lookup_count(), 0);
    assert!(mailer.sent_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn delivery_failure_writes_no_credential() {
    let user = test_user();
    let otps = MockOtpRepo::empty();
    let uc = usecase(
        MockUserPort::new(vec![user.clone()]),
        otps.clone(),
        MockMailer::failing(),
    );

    let err = uc.execute(input(&user.email, TEST_PASSWORD)).await.unwrap_err();

    assert!(matches!(err, AccountError::DeliveryFailed));
    assert!(otps.otps_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn pending_check_is_scoped_to_the_user() {
    let user = test_user();
    let other = Uuid::new_v4();
    let otps = MockOtpRepo::new(vec![test_otp(other, 120)]);
    let mailer = MockMailer::new();
    let uc = usecase(
        MockUserPort::new(vec![user.clone()]),
        otps.clone(),
        mailer.clone(),
    );

    let outcome = uc.execute(input(&user.email, TEST_PASSWORD)).await.unwrap();

    // Another user's live credential must not suppress this one's issuance.
    assert!(matches!(outcome, IssueOutcome::Issued { .. }));
    assert_eq!(mailer.sent_handle().lock().unwrap().len(), 1);
}
