use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rand::distributions::Alphanumeric;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use super::connector::SmtpConnect;
use super::machine::ProbeMachine;
use super::options::SmtpProbeOptions;
use super::session::SmtpSession;
use super::types::ProbeReport;

const CATCH_ALL_LOCAL_LEN: usize = 20;

/// Runs one SMTP dialogue per call against a single mail exchanger.
#[derive(Clone)]
pub struct SmtpProber {
    options: SmtpProbeOptions,
    connector: Arc<dyn SmtpConnect>,
}

impl std::fmt::Debug for SmtpProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpProber")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SmtpProber {
    pub fn new(options: SmtpProbeOptions, connector: Arc<dyn SmtpConnect>) -> Self {
        Self { options, connector }
    }

    /// Asks `host` whether it would accept mail for `local@domain`. When
    /// catch-all detection is on, a random recipient on the same domain is
    /// tried after an accepted target.
    pub async fn probe(&self, host: &str, local: &str, domain: &str) -> ProbeReport {
        let random = self
            .options
            .catch_all_check
            .then(|| random_local_part(CATCH_ALL_LOCAL_LEN));
        self.probe_with(host, local, domain, random).await
    }

    /// Same as [`probe`](Self::probe) with a caller-chosen catch-all local part.
    pub async fn probe_with(
        &self,
        host: &str,
        local: &str,
        domain: &str,
        catch_all_local: Option<String>,
    ) -> ProbeReport {
        let machine = ProbeMachine::new(
            self.options.helo_name(),
            self.options.mail_from.trim(),
            format!("{local}@{domain}"),
            catch_all_local.map(|random| format!("{random}@{domain}")),
        );
        let connect_timeout = self.options.connect_timeout;
        let command_timeout = self.options.command_timeout;
        let port = self.options.port;

        let session = async move {
            debug!(host, port, "connecting to mail exchanger");
            let stream =
                match tokio::time::timeout(connect_timeout, self.connector.connect(host, port)).await {
                    Ok(Ok(stream)) => stream,
                    Ok(Err(err)) => {
                        warn!(host, error = %err, "SMTP connection failed");
                        return ProbeReport::unreachable(host, err.to_string());
                    }
                    Err(_) => {
                        warn!(host, ?connect_timeout, "SMTP connection timed out");
                        return ProbeReport::unreachable(
                            host,
                            format!("connection timed out after {connect_timeout:?}"),
                        );
                    }
                };
            drive(host, stream, machine, command_timeout).await
        };

        match tokio::time::timeout(self.options.probe_timeout, session).await {
            Ok(report) => report,
            Err(_) => {
                warn!(host, timeout = ?self.options.probe_timeout, "SMTP probe exceeded its deadline");
                ProbeReport::unreachable(host, "SMTP probe timed out")
            }
        }
    }
}

/// Pumps replies into `machine` and its commands back to the server until
/// the dialogue ends or the transport fails.
pub(crate) async fn drive<S>(
    host: &str,
    stream: S,
    mut machine: ProbeMachine,
    command_timeout: Duration,
) -> ProbeReport
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    machine.connected();
    let mut session = SmtpSession::new(host, stream, command_timeout);
    loop {
        let reply = match session.read_reply(machine.state()).await {
            Ok(reply) => reply,
            Err(err) => {
                machine.fail(err.to_string());
                break;
            }
        };
        let Some(command) = machine.advance(&reply) else {
            break;
        };
        if let Err(err) = session.send(&command.to_string(), machine.state()).await {
            machine.fail(err.to_string());
            break;
        }
    }

    let report = ProbeReport {
        host: host.to_string(),
        state: machine.state(),
        details: machine.details(),
        outcome: machine.outcome(),
        reason: machine.reason().map(str::to_string),
        transcript: session.transcript,
    };
    info!(
        host,
        outcome = %report.outcome,
        catch_all = report.details.catch_all,
        state = ?report.state,
        "SMTP probe finished"
    );
    report
}

/// Lowercase alphanumeric local part, clamped to 6..=32 characters.
pub(crate) fn random_local_part(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len.clamp(6, 32))
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}
