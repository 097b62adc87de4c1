use clickgate_account::domain::types::RECEIVE_MSG;
use clickgate_account::usecase::check::CheckOtpUseCase;
use clickgate_account::usecase::confirm::{ConfirmOtpInput, ConfirmOtpUseCase};
use clickgate_account::usecase::login::{IssueOtpInput, IssueOtpUseCase, IssueOutcome};
use clickgate_account::usecase::session::{issue_session_token, validate_session_token};

use crate::helpers::{
    MockMailer, MockNotifier, MockOtpRepo, MockUserPort, TEST_PASSWORD, TEST_SESSION_SECRET,
    test_user,
};

/// The whole funnel against one shared store: password check issues a
/// credential and a link, the link confirms and pushes the hub event, the
/// poll signs the user in.
#[tokio::test]
async fn full_two_step_flow_signs_the_user_in() {
    let user = test_user();
    let users = MockUserPort::new(vec![user.clone()]);
    let otps = MockOtpRepo::empty();
    let mailer = MockMailer::new();
    let notifier = MockNotifier::new();

    // Step one: password.
    let issue = IssueOtpUseCase {
        users: users.clone(),
        otps: otps.clone(),
        mailer: mailer.clone(),
        base_url: "https://clickgate.example.com".to_owned(),
    };
    let outcome = issue
        .execute(IssueOtpInput {
            email: user.email.clone(),
            password: TEST_PASSWORD.to_owned(),
        })
        .await
        .unwrap();
    let IssueOutcome::Issued {
        request_id,
        expires_at,
        ..
    } = outcome
    else {
        panic!("expected a fresh issuance");
    };
    assert_eq!(mailer.sent_handle().lock().unwrap().len(), 1);

    // A second login while the credential is live changes nothing.
    let repeat = issue
        .execute(IssueOtpInput {
            email: user.email.clone(),
            password: TEST_PASSWORD.to_owned(),
        })
        .await
        .unwrap();
    assert!(matches!(repeat, IssueOutcome::AlreadyPending { .. }));
    assert_eq!(mailer.sent_handle().lock().unwrap().len(), 1);

    // Step two: the emailed link.
    let confirm = ConfirmOtpUseCase {
        users: users.clone(),
        otps: otps.clone(),
        notifier: notifier.clone(),
    };
    let link = ConfirmOtpInput {
        request_id: request_id.to_string(),
        ts: expires_at.timestamp(),
    };
    let confirmed = confirm.execute(link).await.unwrap();
    assert_eq!(confirmed, user.id);

    let events = notifier.events_handle();
    {
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.event, RECEIVE_MSG);
        assert_eq!(events[0].1.data, "Authenticated");
    }

    // The waiting page's poll finds the live credential and signs in.
    let check = CheckOtpUseCase {
        users: users.clone(),
        otps: otps.clone(),
    };
    let signed_in = check.execute(user.id).await.unwrap().unwrap();
    assert_eq!(signed_in.id, user.id);

    let (token, _) = issue_session_token(signed_in.id, TEST_SESSION_SECRET, true).unwrap();
    let session_user = validate_session_token(&token, TEST_SESSION_SECRET).unwrap();
    assert_eq!(session_user, user.id);
}
