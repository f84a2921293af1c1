//! Test doubles for the dispatch core's collaborators.

mod conn;
mod logs;
mod pool;
mod tracker;

use butlerd_types::InboundMessage;
use serde_json::Value;

pub(crate) use self::conn::RecordingConn;
pub(crate) use self::logs::CapturedLogs;
pub(crate) use self::pool::AccountingPool;
pub(crate) use self::tracker::{
    SCRIPTED_BPS, SCRIPTED_ETA, TrackerEvent, TrackerLog, scripted_factory,
};

use crate::{Credential, Router, VersionInfo};

/// Version string every test router reports.
pub(crate) const TEST_VERSION: &str = "v1.0.0-test";

/// Client that remembers the credential it was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TestClient {
    pub(crate) credential: Credential,
}

pub(crate) type TestResolver = fn(&Credential) -> TestClient;

pub(crate) type TestRouter = Router<AccountingPool, TestResolver>;


pub(crate) fn resolve_client(credential: &Credential) -> TestClient {
    TestClient {
        credential: credential.clone(),
    }
}

pub(crate) fn router_with_pool(pool: AccountingPool) -> TestRouter {
    Router::new(
        pool,
        resolve_client as TestResolver,
        VersionInfo::new("1.0.0-test", TEST_VERSION),
    )
}

pub(crate) fn test_router() -> TestRouter {
    router_with_pool(AccountingPool::default())
}

pub(crate) fn request(id: i64, method: &str, params: Value) -> InboundMessage {
    InboundMessage::request(id, method, Some(params))
}

pub(crate) fn notification(method: &str) -> InboundMessage {
    InboundMessage::notification(method, None)
}
