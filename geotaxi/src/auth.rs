use crate::credentials::CredentialTable;
use crate::error::{AuthError, SinkError};
use crate::store::Store;
use geotaxi_codecs::resp::Command;
use geotaxi_codecs::PositionReport;
use std::net::IpAddr;
use std::sync::Arc;

pub const BADHASH_OPERATORS: &str = "badhash_operators";
pub const BADHASH_TAXIS: &str = "badhash_taxis_ids";
pub const BADHASH_IPS: &str = "badhash_ips";

#[derive(Debug, Clone)]
pub enum Authenticator {
    /// Every report is accepted.
    Disabled,
    Enabled(Arc<CredentialTable>),
}

impl Authenticator {
    /// Checks the report's hash against its operator's secret.
    ///
    /// A bad hash from a registered operator is charged to the operator, the
    /// taxi and the sending IP before the report is rejected.
    pub async fn check<S>(
        &self,
        report: &PositionReport,
        source: IpAddr,
        store: &mut S,
    ) -> Result<(), AuthError>
    where
        S: Store + ?Sized,
    {
        let Authenticator::Enabled(credentials) = self else {
            return Ok(());
        };
        let Some(secret) = credentials.secret(&report.operator) else {
            return Err(AuthError::UnknownOperator(report.operator.clone()));
        };
        if report.digest_fields().verify(secret, &report.hash) {
            return Ok(());
        }

        let charges = misbehavior(report, source);
        if let Err(e) = store.pipeline(charges.clone()).await {
            tracing::error!("{}", SinkError::store(&charges, e));
        }
        Err(AuthError::BadDigest {
            operator: report.operator.clone(),
            taxi: report.taxi.clone(),
        })
    }
}

fn misbehavior(report: &PositionReport, source: IpAddr) -> Vec<Command> {
    [
        (BADHASH_OPERATORS, report.operator.clone()),
        (BADHASH_TAXIS, report.taxi.clone()),
        (BADHASH_IPS, source.to_string()),
    ]
    .into_iter()
    .map(|(key, member)| Command::ZIncrBy {
        key: key.to_string(),
        increment: 1,
        member,
    })
    .collect()
}
