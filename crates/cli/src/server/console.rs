use k8sdns_application::use_cases::{LookupRecordsUseCase, PushRecordsUseCase};
use k8sdns_domain::RecordType;
use k8sdns_infrastructure::dns::{AnswerCache, DnsMetrics};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Line-oriented front end to the cache.
///
/// ```text
/// svc1.example.com A
/// push web.example.com 10.0.0.1,10.0.0.2 300
/// retract web.example.com
/// ready
/// stats
/// ```
pub struct QueryConsole {
    lookup: Arc<LookupRecordsUseCase>,
    push: Arc<PushRecordsUseCase>,
    cache: Arc<AnswerCache>,
    metrics: DnsMetrics,
}

impl QueryConsole {
    pub fn new(
        lookup: Arc<LookupRecordsUseCase>,
        push: Arc<PushRecordsUseCase>,
        cache: Arc<AnswerCache>,
        metrics: DnsMetrics,
    ) -> Self {
        Self {
            lookup,
            push,
            cache,
            metrics,
        }
    }

    /// Handle one input line and return the text to print.
    pub fn handle_line(&self, line: &str) -> String {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => String::new(),
            ["ready"] => self.lookup.is_ready().to_string(),
            ["stats"] => self.stats(),
            ["retract", name] => format!("removed {}", self.push.retract(name)),
            ["push", name, addresses, ttl] => self.push_addresses(name, addresses, ttl),
            [name, qtype] => self.query(name, qtype),
            [name] => self.query(name, "A"),
            _ => format!("error: cannot parse '{}'", line.trim()),
        }
    }

    fn query(&self, name: &str, qtype: &str) -> String {
        let record_type: RecordType = match qtype.parse() {
            Ok(rt) => rt,
            Err(e) => return format!("error: {e}"),
        };

        match self.lookup.execute(name, record_type) {
            Some(answer) => {
                let ttl = answer.remaining_ttl(Instant::now());
                answer
                    .records()
                    .iter()
                    .map(|r| format!("{}\t{}\t{}\t{}", r.name(), ttl, r.record_type(), r.data()))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            None => format!("no answer for {name} {record_type}"),
        }
    }

    fn push_addresses(&self, name: &str, addresses: &str, ttl: &str) -> String {
        let ttl: u32 = match ttl.parse() {
            Ok(ttl) => ttl,
            Err(_) => return format!("error: invalid ttl '{ttl}'"),
        };
        let addresses: Vec<String> = addresses.split(',').map(str::to_string).collect();

        match self.push.update_records(name, &addresses, ttl) {
            Ok(stored) => format!("stored {stored}"),
            Err(e) => format!("error: {e}"),
        }
    }

    fn stats(&self) -> String {
        let dns = self.metrics.snapshot();
        let cache = self.cache.metrics_snapshot();
        format!(
            "entries={} names={} records={} requests={} cache_hits={} hit_rate={:.2} malformed={}",
            cache.total_entries,
            cache.total_names,
            dns.records,
            dns.requests,
            dns.cache_hits,
            dns.hit_rate,
            dns.malformed_objects,
        )
    }
}

/// Serve lines from `input` until EOF or cancellation.
pub async fn run_console<R, W>(
    console: &QueryConsole,
    input: R,
    mut output: W,
    shutdown: CancellationToken,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    info!("Query console ready");

    loop {
        let line = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            debug!("Console input closed");
            break;
        };

        let reply = console.handle_line(&line);
        if !reply.is_empty() {
            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
    }

    Ok(())
}
