use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::error::SmtpProbeError;
use super::machine::SmtpState;

const MAX_LINE_LEN: u64 = 2048;
const MAX_REPLY_LINES: usize = 128;

/// A raw SMTP reply, preserving the numeric status code and message text.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn new(code: u16, text: &str) -> Self {
        Self {
            code,
            lines: vec![text.to_string()],
        }
    }

    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }

    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

/// Line-level SMTP client over any async byte stream. Every exchange is
/// bounded by `timeout` and recorded in `transcript`.
pub(crate) struct SmtpSession<S> {
    host: String,
    stream: BufReader<S>,
    timeout: Duration,
    pub transcript: Vec<String>,
}

impl<S> SmtpSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(host: &str, stream: S, timeout: Duration) -> Self {
        Self {
            host: host.to_string(),
            stream: BufReader::new(stream),
            timeout,
            transcript: Vec::new(),
        }
    }

    pub(crate) async fn send(
        &mut self,
        command: &str,
        state: SmtpState,
    ) -> Result<(), SmtpProbeError> {
        self.record("C", command);
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        let writer = self.stream.get_mut();
        let write = async {
            writer.write_all(&line).await?;
            writer.flush().await
        };
        tokio::time::timeout(self.timeout, write)
            .await
            .map_err(|_| SmtpProbeError::Timeout { state })?
            .map_err(SmtpProbeError::io)
    }

    pub(crate) async fn read_reply(&mut self, state: SmtpState) -> Result<SmtpReply, SmtpProbeError> {
        let reply = tokio::time::timeout(self.timeout, self.read_reply_inner())
            .await
            .map_err(|_| SmtpProbeError::Timeout { state })??;
        self.record_reply(&reply);
        Ok(reply)
    }

    async fn read_reply_inner(&mut self) -> Result<SmtpReply, SmtpProbeError> {
        let mut code: Option<u16> = None;
        let mut lines = Vec::new();
        loop {
            let line = self.read_line().await?;
            if line.len() < 3 {
                return Err(SmtpProbeError::protocol(format!("invalid reply: {line}")));
            }
            let parsed_code = line
                .get(..3)
                .and_then(|digits| digits.parse::<u16>().ok())
                .filter(|c| (200..600).contains(c))
                .ok_or_else(|| SmtpProbeError::protocol(format!("invalid code in line: {line}")))?;
            if let Some(existing) = code {
                if existing != parsed_code {
                    return Err(SmtpProbeError::protocol(format!(
                        "inconsistent reply codes: {existing} vs {parsed_code}"
                    )));
                }
            } else {
                code = Some(parsed_code);
            }
            let continuation = line.as_bytes().get(3) == Some(&b'-');
            lines.push(line.get(4..).unwrap_or_default().to_string());
            if !continuation {
                break;
            }
            if lines.len() >= MAX_REPLY_LINES {
                return Err(SmtpProbeError::protocol("reply has too many lines"));
            }
        }
        Ok(SmtpReply {
            code: code.unwrap_or_default(),
            lines,
        })
    }

    async fn read_line(&mut self) -> Result<String, SmtpProbeError> {
        let mut raw = Vec::new();
        let read = (&mut self.stream)
            .take(MAX_LINE_LEN)
            .read_until(b'\n', &mut raw)
            .await
            .map_err(SmtpProbeError::io)?;
        if read == 0 {
            return Err(SmtpProbeError::io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed while reading reply",
            )));
        }
        if !raw.ends_with(b"\n") {
            return Err(SmtpProbeError::protocol("reply line too long or truncated"));
        }
        raw.pop();
        if raw.ends_with(b"\r") {
            raw.pop();
        }
        String::from_utf8(raw).map_err(|err| SmtpProbeError::protocol(format!("utf8 error: {err}")))
    }

    fn record(&mut self, direction: &str, message: &str) {
        self.transcript
            .push(format!("[{}] {direction}: {message}", self.host));
    }

    fn record_reply(&mut self, reply: &SmtpReply) {
        if reply.lines.iter().all(String::is_empty) {
            self.record("S", &reply.code.to_string());
        } else {
            for line in &reply.lines {
                self.record("S", &format!("{} {}", reply.code, line));
            }
        }
    }
}
