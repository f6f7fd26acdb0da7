use pos_finance_proxy::config::PosIdentity;
use pos_finance_proxy::domain::outcome::OutcomeStatus;
use pos_finance_proxy::domain::payment::PaymentRequest;
use pos_finance_proxy::domain::terminal::Terminal;
use pos_finance_proxy::gateways::mock::{MockFault, MockGateway, RecordedCall};
use pos_finance_proxy::repo::memory::InMemoryTerminalDirectory;
use pos_finance_proxy::repo::terminals_repo::TerminalDirectory;
use pos_finance_proxy::service::payment_service::{PaymentDecision, PaymentResult, PaymentService, ResultSource};
use pos_finance_proxy::service::registration::{RegistrationOutcome, RegistrationRequest, RejectionReason};
use std::sync::Arc;

const ORIGIN: &str = "http://pos.example.com";
const ISSUED_KEY: &str = "issued-signing-key";

fn build_service(gateway: MockGateway) -> (PaymentService, Arc<MockGateway>, Arc<InMemoryTerminalDirectory>) {
    let gateway = Arc::new(gateway);
    let directory = Arc::new(InMemoryTerminalDirectory::new());
    let service = PaymentService {
        directory: directory.clone(),
        gateway: gateway.clone(),
        identity: PosIdentity::default(),
        created_by: "tests".to_string(),
    };
    (service, gateway, directory)
}

async fn seed_terminal(directory: &InMemoryTerminalDirectory, register: &str) {
    directory
        .insert(&Terminal::new(ISSUED_KEY, "tok-device", "30188105", ORIGIN, register), "tests")
        .await
        .unwrap();
}

fn completed(decision: PaymentDecision) -> PaymentResult {
    match decision {
        PaymentDecision::Completed(result) => result,
        PaymentDecision::NeedsRegistration => panic!("expected a completed payment"),
    }
}

fn enrollment() -> RegistrationRequest {
    RegistrationRequest {
        device_token: "tok".to_string(),
        merchant_id: "30188105".to_string(),
    }
}

#[tokio::test]
async fn unknown_terminal_needs_registration_without_calling_gateway() {
    let (service, gateway, _) = build_service(MockGateway::new(ISSUED_KEY));
    let request = PaymentRequest::new("44.00", ORIGIN, "R1").unwrap();

    let decision = service.process(&request).await.unwrap();
    assert_eq!(decision, PaymentDecision::NeedsRegistration);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn register_then_pay_is_approved() {
    let (service, gateway, directory) = build_service(MockGateway::new(ISSUED_KEY));
    let pending = PaymentRequest::new("44.00", ORIGIN, "R1")
        .unwrap()
        .with_pre_approval_code(Some("01234567".to_string()));

    match service.register(&enrollment(), &pending).await {
        RegistrationOutcome::Enrolled { terminal, outcome } => {
            assert_eq!(outcome.status, OutcomeStatus::Approved);
            assert_eq!(terminal.signing_key, ISSUED_KEY);
            assert!(terminal.gateway_device_id.starts_with("tok-"));
        }
        other => panic!("unexpected registration outcome: {:?}", other),
    }
    assert!(directory.find(ORIGIN, "R1").await.unwrap().is_some());

    let result = completed(service.process(&pending).await.unwrap());
    assert_eq!(result.outcome.status, OutcomeStatus::Approved);
    assert_eq!(result.source, ResultSource::Gateway);
    assert_eq!(result.amount_minor, Some(4400));
    assert_eq!(result.pos_register_id, "R1");
    assert!(result.purchase_number.unwrap().starts_with("mock_"));

    let calls = gateway.calls();
    assert_eq!(calls.len(), 2);
    match &calls[1] {
        RecordedCall::Authorize(payload) => {
            assert_eq!(payload.finance_amount, "4400");
            assert_eq!(payload.purchase_amount, "4400");
            assert_eq!(payload.pre_approval_code, "01234567");
            assert_eq!(payload.merchant_id, "30188105");
            assert!(!payload.signature.is_empty());
        }
        other => panic!("expected an authorisation, got {:?}", other),
    }
}

#[tokio::test]
async fn unverified_response_is_failed_even_when_approved() {
    let (service, _, directory) = build_service(MockGateway::new(ISSUED_KEY).with_fault(MockFault::TamperedSignature));
    seed_terminal(&directory, "R1").await;

    let request = PaymentRequest::new("10.00", ORIGIN, "R1").unwrap();
    let result = completed(service.process(&request).await.unwrap());
    assert_eq!(result.outcome.status, OutcomeStatus::Failed);
    assert_eq!(result.source, ResultSource::SignatureMismatch);
    assert_eq!(result.purchase_number, None);
    assert_eq!(result.outcome.code.as_deref(), Some("SPRA01"));
}

#[tokio::test]
async fn declined_payment_carries_no_purchase_number() {
    let (service, _, directory) = build_service(MockGateway::new(ISSUED_KEY).with_authorisation_code("FPRA99"));
    seed_terminal(&directory, "R1").await;

    let request = PaymentRequest::new("10.00", ORIGIN, "R1").unwrap();
    let result = completed(service.process(&request).await.unwrap());
    assert_eq!(result.outcome.status, OutcomeStatus::Declined);
    assert_eq!(result.purchase_number, None);
    assert_eq!(result.amount_minor, None);
}

#[tokio::test]
async fn negative_amount_is_refunded_as_positive_adjustment() {
    let (service, gateway, directory) = build_service(MockGateway::new(ISSUED_KEY));
    seed_terminal(&directory, "R1").await;

    let request = PaymentRequest::new("-10.50", ORIGIN, "R1")
        .unwrap()
        .with_purchase_number(Some("P-77".to_string()))
        .with_sale_id(Some("sale-1".to_string()));
    let result = completed(service.process(&request).await.unwrap());
    assert_eq!(result.outcome.status, OutcomeStatus::Approved);
    assert_eq!(result.amount_minor, Some(1050));

    match gateway.calls().last() {
        Some(RecordedCall::AdjustSale(payload)) => {
            assert_eq!(payload.amount, "1050");
            assert_eq!(payload.purchase_ref, "P-77");
            assert_eq!(payload.pos_transaction_ref, "sale-1");
        }
        other => panic!("expected a sales adjustment, got {:?}", other),
    }
}

#[tokio::test]
async fn refund_without_purchase_number_is_invalid() {
    let (service, gateway, directory) = build_service(MockGateway::new(ISSUED_KEY));
    seed_terminal(&directory, "R1").await;

    let request = PaymentRequest::new("-10.50", ORIGIN, "R1").unwrap();
    let err = service.process(&request).await.unwrap_err();
    assert_eq!(err.field, "purchaseno");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn zero_amount_is_invalid() {
    let (service, _, directory) = build_service(MockGateway::new(ISSUED_KEY));
    seed_terminal(&directory, "R1").await;

    let request = PaymentRequest::new("0.00", ORIGIN, "R1").unwrap();
    assert_eq!(service.process(&request).await.unwrap_err().field, "amount");
}

#[tokio::test]
async fn unreachable_gateway_fails_and_timeout_is_unknown() {
    let (service, _, directory) = build_service(MockGateway::new(ISSUED_KEY).with_fault(MockFault::Unreachable));
    seed_terminal(&directory, "R1").await;
    let request = PaymentRequest::new("10.00", ORIGIN, "R1").unwrap();

    let result = completed(service.process(&request).await.unwrap());
    assert_eq!(result.outcome.status, OutcomeStatus::Failed);
    assert_eq!(result.source, ResultSource::Transport);

    let (service, _, directory) = build_service(MockGateway::new(ISSUED_KEY).with_fault(MockFault::Timeout));
    seed_terminal(&directory, "R1").await;
    let result = completed(service.process(&request).await.unwrap());
    assert_eq!(result.outcome.status, OutcomeStatus::Unknown);
    assert_eq!(result.source, ResultSource::Transport);
}

#[tokio::test]
async fn second_registration_is_rejected_and_first_key_kept() {
    let (first, _, directory) = build_service(MockGateway::new(ISSUED_KEY));
    let pending = PaymentRequest::new("44.00", ORIGIN, "R1").unwrap();
    assert!(matches!(
        first.register(&enrollment(), &pending).await,
        RegistrationOutcome::Enrolled { .. }
    ));

    let second = PaymentService {
        gateway: Arc::new(MockGateway::new("a-different-key")),
        ..first.clone()
    };
    match second.register(&enrollment(), &pending).await {
        RegistrationOutcome::Rejected { reason, .. } => {
            assert_eq!(reason, RejectionReason::PreviouslyRegistered)
        }
        other => panic!("expected rejection, got {:?}", other),
    }

    let kept = directory.find(ORIGIN, "R1").await.unwrap().unwrap();
    assert_eq!(kept.signing_key, ISSUED_KEY);
}

#[tokio::test]
async fn token_rejections_do_not_touch_the_directory() {
    for (code, expected) in [
        ("FCRK01", RejectionReason::DeviceTokenNotFound),
        ("FCRK02", RejectionReason::DeviceTokenAlreadyUsed),
        ("EVAL01", RejectionReason::GatewayRejected),
    ] {
        let (service, _, directory) = build_service(MockGateway::new(ISSUED_KEY).with_registration_code(code));
        let pending = PaymentRequest::new("44.00", ORIGIN, "R1").unwrap();

        match service.register(&enrollment(), &pending).await {
            RegistrationOutcome::Rejected { reason, .. } => assert_eq!(reason, expected, "{}", code),
            other => panic!("{}: unexpected outcome {:?}", code, other),
        }
        assert!(directory.find(ORIGIN, "R1").await.unwrap().is_none());
    }
}

#[tokio::test]
async fn blank_enrollment_is_rejected_before_the_gateway() {
    let (service, gateway, _) = build_service(MockGateway::new(ISSUED_KEY));
    let pending = PaymentRequest::new("44.00", ORIGIN, "R1").unwrap();
    let request = RegistrationRequest {
        device_token: "   ".to_string(),
        merchant_id: "30188105".to_string(),
    };

    match service.register(&request, &pending).await {
        RegistrationOutcome::Rejected { reason, .. } => assert_eq!(reason, RejectionReason::InvalidRequest),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn refund_amount_without_absolute_value_is_invalid() {
    let (service, gateway, directory) = build_service(MockGateway::new(ISSUED_KEY));
    seed_terminal(&directory, "R1").await;

    assert_eq!(
        PaymentRequest::new("-92233720368547758.08", ORIGIN, "R1").unwrap_err().field,
        "amount"
    );

    let mut request = PaymentRequest::new("-1.00", ORIGIN, "R1")
        .unwrap()
        .with_purchase_number(Some("P1".to_string()));
    request.amount_minor = i64::MIN;
    let err = service.process(&request).await.unwrap_err();
    assert_eq!(err.field, "amount");
    assert!(gateway.calls().is_empty());
}
