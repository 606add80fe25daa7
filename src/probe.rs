//! Endpoint prober: pull catalog icons onto a clock with an undocumented API.
//!
//! Each identifier is tried against an ordered list of guessed URL shapes.
//! The first `200 OK` wins; any other status, timeout or transport error just
//! moves on to the next guess. When every guess fails the identifier is
//! reported as exhausted together with the manual steps for the device's web
//! UI. One identifier's failure never stops the rest of the batch.

use crate::{Error, ProbeConfig, Result};
use reqwest::blocking::Client;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Opaque token naming a remote icon (usually a LaMetric catalog number).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconIdentifier(String);

impl IconIdentifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IconIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IconIdentifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for IconIdentifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u32> for IconIdentifier {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

/// Minimal HTTP capability the prober needs.
pub trait Fetcher: Send + Sync {
    /// Issue a GET and return the response status code.
    fn get_status(&self, url: &str, timeout: Duration) -> Result<u16>;
}

/// `Fetcher` backed by a blocking reqwest client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn get_status(&self, url: &str, timeout: Duration) -> Result<u16> {
        let res = self.client.get(url).timeout(timeout).send()?;
        Ok(res.status().as_u16())
    }
}

/// Try `candidates` in order until `attempt` succeeds.
///
/// Returns the index and value of the first success, or every error in
/// order when all fail. Candidates after the first success are never
/// pulled from the iterator.
pub fn first_success<C, T, E, I, F>(
    candidates: I,
    mut attempt: F,
) -> std::result::Result<(usize, T), Vec<E>>
where
    I: IntoIterator<Item = C>,
    F: FnMut(usize, C) -> std::result::Result<T, E>,
{
    let mut errors = Vec::new();
    for (i, c) in candidates.into_iter().enumerate() {
        match attempt(i, c) {
            Ok(v) => return Ok((i, v)),
            Err(e) => errors.push(e),
        }
    }
    Err(errors)
}

/// Expand an endpoint template for one identifier.
pub fn expand_endpoint(template: &str, host: &str, id: &IconIdentifier) -> Result<String> {
    let raw = template.replace("{host}", host).replace("{id}", id.as_str());
    let parsed = url::Url::parse(&raw)
        .map_err(|e| Error::Config(format!("bad endpoint URL '{}': {}", raw, e)))?;
    Ok(parsed.to_string())
}

/// Steps for fetching `id` by hand through the clock's Icons tab.
pub fn manual_instructions(host: &str, id: &IconIdentifier) -> String {
    format!(
        "→ Please download manually:\n   1. Open http://{host} in browser\n   2. Go to Icons tab\n   3. Enter icon ID: {id}\n   4. Click Preview, then Download\n"
    )
}

/// One failed attempt against one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptFailure {
    pub url: String,
    pub reason: String,
}

/// Terminal state for one identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Succeeded { url: String },
    ExhaustedAllEndpoints {
        failures: Vec<AttemptFailure>,
        guidance: String,
    },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Succeeded { .. })
    }

    /// Manual fallback text, present only when every endpoint failed.
    pub fn guidance(&self) -> Option<&str> {
        match self {
            ProbeOutcome::ExhaustedAllEndpoints { guidance, .. } => Some(guidance),
            ProbeOutcome::Succeeded { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub id: IconIdentifier,
    pub outcome: ProbeOutcome,
}

/// Progress notifications emitted while probing.
#[derive(Debug)]
pub enum ProbeEvent<'a> {
    Started(&'a IconIdentifier),
    Attempt { id: &'a IconIdentifier, url: &'a str },
    Finished(&'a ProbeReport),
}

/// Drives the guess-then-fallback protocol for a batch of identifiers.
pub struct Prober<F: Fetcher = HttpFetcher> {
    fetcher: F,
    config: ProbeConfig,
}

impl Prober<HttpFetcher> {
    /// Prober talking real HTTP.
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(concat!("awtrix-icons/", env!("CARGO_PKG_VERSION")))?;
        Self::with_fetcher(fetcher, config)
    }
}

impl<F: Fetcher> Prober<F> {
    pub fn with_fetcher(fetcher: F, config: ProbeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { fetcher, config })
    }

    /// `ids`, or the configured default batch when `ids` is empty.
    pub fn identifiers_or_default(&self, ids: &[IconIdentifier]) -> Vec<IconIdentifier> {
        if ids.is_empty() {
            self.config
                .default_identifiers
                .iter()
                .map(|s| IconIdentifier::new(s.as_str()))
                .collect()
        } else {
            ids.to_vec()
        }
    }

    /// Probe one identifier, trying endpoints in order.
    pub fn probe(&self, id: &IconIdentifier) -> ProbeReport {
        self.probe_with(id, &mut |_| {})
    }

    fn probe_with(&self, id: &IconIdentifier, on_event: &mut dyn FnMut(&ProbeEvent)) -> ProbeReport {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let host = self.config.device_host.as_str();

        let result = first_success(&self.config.endpoints, |_, template| {
            let url = match expand_endpoint(template, host, id) {
                Ok(url) => url,
                Err(e) => {
                    return Err(AttemptFailure {
                        url: template.clone(),
                        reason: e.to_string(),
                    })
                }
            };
            on_event(&ProbeEvent::Attempt { id, url: &url });
            log::debug!("icon {}: GET {}", id, url);
            match self.fetcher.get_status(&url, timeout) {
                Ok(200) => Ok(url),
                Ok(status) => Err(AttemptFailure {
                    url,
                    reason: format!("HTTP {}", status),
                }),
                Err(e) => Err(AttemptFailure {
                    url,
                    reason: e.to_string(),
                }),
            }
        });

        let outcome = match result {
            Ok((_, url)) => {
                log::info!("icon {} fetched via {}", id, url);
                ProbeOutcome::Succeeded { url }
            }
            Err(failures) => {
                log::warn!("icon {}: all {} endpoints failed", id, failures.len());
                ProbeOutcome::ExhaustedAllEndpoints {
                    failures,
                    guidance: manual_instructions(host, id),
                }
            }
        };
        ProbeReport {
            id: id.clone(),
            outcome,
        }
    }

    /// Probe every identifier in order, pausing `delay_ms` between them.
    pub fn probe_all(&self, ids: &[IconIdentifier]) -> Vec<ProbeReport> {
        self.probe_all_with(ids, |_| {})
    }

    /// Like `probe_all`, reporting progress through `on_event`.
    pub fn probe_all_with<H>(&self, ids: &[IconIdentifier], mut on_event: H) -> Vec<ProbeReport>
    where
        H: FnMut(&ProbeEvent),
    {
        let ids = self.identifiers_or_default(ids);
        let delay = Duration::from_millis(self.config.delay_ms);
        let mut reports = Vec::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                std::thread::sleep(delay);
            }
            on_event(&ProbeEvent::Started(id));
            let report = self.probe_with(id, &mut on_event);
            on_event(&ProbeEvent::Finished(&report));
            reports.push(report);
        }
        reports
    }

    /// Probe identifiers on up to `jobs` threads.
    ///
    /// Endpoint order and first-success short-circuit still hold per
    /// identifier; each worker paces its own requests by `delay_ms`.
    /// Reports come back in input order.
    pub fn probe_all_parallel<H>(&self, ids: &[IconIdentifier], jobs: usize, on_event: H) -> Vec<ProbeReport>
    where
        H: Fn(&ProbeEvent) + Sync,
    {
        let ids = self.identifiers_or_default(ids);
        let jobs = jobs.clamp(1, ids.len().max(1));
        if jobs == 1 {
            return self.probe_all_with(&ids, |e| on_event(e));
        }

        let delay = Duration::from_millis(self.config.delay_ms);
        let next = AtomicUsize::new(0);

        let batches: Vec<Vec<(usize, ProbeReport)>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..jobs)
                .map(|_| {
                    scope.spawn(|| {
                        let mut done = Vec::new();
                        loop {
                            let i = next.fetch_add(1, Ordering::SeqCst);
                            let Some(id) = ids.get(i) else { break };
                            if !done.is_empty() && !delay.is_zero() {
                                std::thread::sleep(delay);
                            }
                            on_event(&ProbeEvent::Started(id));
                            let report = self.probe_with(id, &mut |e| on_event(e));
                            on_event(&ProbeEvent::Finished(&report));
                            done.push((i, report));
                        }
                        done
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|w| w.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        let mut slots: Vec<Option<ProbeReport>> = vec![None; ids.len()];
        for (i, report) in batches.into_iter().flatten() {
            slots[i] = Some(report);
        }
        slots.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted fetcher: status (or error) per URL, logs every request.
    struct FakeFetcher {
        responses: HashMap<String, Option<u16>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn new(responses: &[(&str, Option<u16>)]) -> Self {
            Self {
                responses: responses.iter().map(|(u, s)| (u.to_string(), *s)).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Fetcher for &FakeFetcher {
        fn get_status(&self, url: &str, _timeout: Duration) -> Result<u16> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(Some(status)) => Ok(*status),
                Some(None) => Err(Error::Network("operation timed out".into())),
                None => Err(Error::Network("connection refused".into())),
            }
        }
    }

    fn test_config() -> ProbeConfig {
        ProbeConfig {
            device_host: "clock.test".into(),
            delay_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn first_success_stops_at_first_ok() {
        let mut tried = Vec::new();
        let r = first_success(0..10, |i, c| {
            tried.push(c);
            if i == 2 {
                Ok(c * 10)
            } else {
                Err(c)
            }
        });
        assert_eq!(r, Ok((2, 20)));
        assert_eq!(tried, vec![0, 1, 2]);
    }

    #[test]
    fn first_success_collects_all_errors() {
        let r: std::result::Result<(usize, ()), Vec<u8>> = first_success([1u8, 2, 3], |_, c| Err(c));
        assert_eq!(r, Err(vec![1, 2, 3]));
    }

    #[test]
    fn short_circuits_after_second_candidate() {
        let fake = FakeFetcher::new(&[
            ("http://clock.test/api/icon?id=2056", Some(404)),
            ("http://clock.test/api/downloadIcon?id=2056", Some(200)),
            ("http://clock.test/icon/2056/download", Some(200)),
        ]);
        let prober = Prober::with_fetcher(&fake, test_config()).unwrap();
        let report = prober.probe(&IconIdentifier::from(2056u32));
        assert_eq!(
            report.outcome,
            ProbeOutcome::Succeeded {
                url: "http://clock.test/api/downloadIcon?id=2056".into()
            }
        );
        assert_eq!(fake.calls().len(), 2);
    }

    #[test]
    fn exhausted_reports_guidance_with_identifier() {
        let fake = FakeFetcher::new(&[
            ("http://clock.test/api/icon?id=833", None),
            ("http://clock.test/api/downloadIcon?id=833", Some(500)),
        ]);
        let prober = Prober::with_fetcher(&fake, test_config()).unwrap();
        let report = prober.probe(&IconIdentifier::from("833"));
        match &report.outcome {
            ProbeOutcome::ExhaustedAllEndpoints { failures, guidance } => {
                assert_eq!(failures.len(), 3);
                assert!(failures[0].reason.contains("timed out"));
                assert_eq!(failures[1].reason, "HTTP 500");
                assert!(guidance.contains("833"));
                assert!(guidance.contains("http://clock.test"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn empty_batch_uses_defaults() {
        let fake = FakeFetcher::new(&[]);
        let prober = Prober::with_fetcher(&fake, test_config()).unwrap();
        let reports = prober.probe_all(&[]);
        let ids: Vec<_> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2056", "833", "1092", "6020", "52580", "2497"]);
        assert_eq!(fake.calls().len(), 18);
    }

    #[test]
    fn failure_does_not_stop_batch() {
        let fake = FakeFetcher::new(&[("http://clock.test/icon/7/download", Some(200))]);
        let prober = Prober::with_fetcher(&fake, test_config()).unwrap();
        let ids = vec![IconIdentifier::from("1"), IconIdentifier::from("7")];
        let mut events = Vec::new();
        let reports = prober.probe_all_with(&ids, |e| {
            if let ProbeEvent::Started(id) = e {
                events.push(id.to_string());
            }
        });
        assert_eq!(events, vec!["1", "7"]);
        assert!(!reports[0].outcome.is_success());
        assert!(reports[1].outcome.is_success());
    }

    #[test]
    fn parallel_keeps_input_order_and_short_circuit() {
        let fake = FakeFetcher::new(&[
            ("http://clock.test/api/icon?id=3", Some(200)),
            ("http://clock.test/api/downloadIcon?id=5", Some(200)),
        ]);
        let prober = Prober::with_fetcher(&fake, test_config()).unwrap();
        let ids: Vec<IconIdentifier> = (1..=6u32).map(IconIdentifier::from).collect();
        let reports = prober.probe_all_parallel(&ids, 3, |_| {});
        let got: Vec<_> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["1", "2", "3", "4", "5", "6"]);
        assert!(reports[2].outcome.is_success());
        assert!(reports[4].outcome.is_success());
        let calls = fake.calls();
        assert_eq!(calls.iter().filter(|u| u.ends_with("=3") || u.contains("/3/")).count(), 1);
        assert_eq!(calls.iter().filter(|u| u.ends_with("=5") || u.contains("/5/")).count(), 2);
    }

    #[test]
    fn parallel_returns_every_report_once() {
        let fake = FakeFetcher::new(&[("http://clock.test/icon/2/download", Some(200))]);
        let prober = Prober::with_fetcher(&fake, test_config()).unwrap();
        let ids: Vec<IconIdentifier> = (1..=3u32).map(IconIdentifier::from).collect();
        let finished = Mutex::new(Vec::new());
        let reports = prober.probe_all_parallel(&ids, 8, |e| {
            if let ProbeEvent::Finished(r) = e {
                finished.lock().unwrap().push(r.id.to_string());
            }
        });
        let got: Vec<_> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["1", "2", "3"]);
        assert!(reports[1].outcome.is_success());
        let mut finished = finished.into_inner().unwrap();
        finished.sort();
        assert_eq!(finished, vec!["1", "2", "3"]);
    }

    #[test]
    fn attempt_events_follow_endpoint_order() {
        let fake = FakeFetcher::new(&[("http://clock.test/icon/42/download", Some(200))]);
        let prober = Prober::with_fetcher(&fake, test_config()).unwrap();
        let mut urls = Vec::new();
        prober.probe_all_with(&[IconIdentifier::from("42")], |e| {
            if let ProbeEvent::Attempt { url, .. } = e {
                urls.push(url.to_string());
            }
        });
        assert_eq!(
            urls,
            vec![
                "http://clock.test/api/icon?id=42",
                "http://clock.test/api/downloadIcon?id=42",
                "http://clock.test/icon/42/download",
            ]
        );
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let fake = FakeFetcher::new(&[]);
        let config = ProbeConfig {
            endpoints: vec![],
            ..test_config()
        };
        assert!(Prober::with_fetcher(&fake, config).is_err());
    }

    #[test]
    fn bad_template_counts_as_failed_candidate() {
        let fake = FakeFetcher::new(&[("http://clock.test/icon/9/download", Some(200))]);
        let config = ProbeConfig {
            endpoints: vec!["not a url {id}".into(), "http://{host}/icon/{id}/download".into()],
            ..test_config()
        };
        let prober = Prober::with_fetcher(&fake, config).unwrap();
        assert!(prober.probe(&IconIdentifier::from("9")).outcome.is_success());
        assert_eq!(fake.calls().len(), 1);
    }
}
