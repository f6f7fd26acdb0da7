pub mod config;
pub mod error;
pub mod domain {
    pub mod outcome;
    pub mod payment;
    pub mod terminal;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod ops;
        pub mod payments;
        pub mod registration;
    }
    pub mod response;
    pub mod routes;
    pub mod session;
}
pub mod repo {
    pub mod memory;
    pub mod pending_requests_repo;
    pub mod terminals_repo;
}
pub mod service {
    pub mod payment_service;
    pub mod registration;
}

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
    pub pending_requests: Arc<dyn repo::pending_requests_repo::PendingRequestStore>,
    pub session_ttl_secs: u64,
}
