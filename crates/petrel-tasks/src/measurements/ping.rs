//! ICMP ping with typed output parsing.

use std::sync::Arc;

use async_trait::async_trait;
use petrel_base::{Dispatcher, StepResults, Task, TaskResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::process::run_command;

/// One echo reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketReport {
  pub icmp_seq: u32,
  pub ttl: u32,
  pub time: f64,
  pub unit: String,
}

/// Parsed result of one ping run.
///
/// Output that cannot be parsed degrades to a report with 100% loss and
/// the raw transcript preserved, rather than a task failure: the probe
/// itself completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingReport {
  pub host: String,
  pub packets: Vec<PacketReport>,
  pub packet_loss: f64,
  pub min_rtt: f64,
  pub avg_rtt: f64,
  pub max_rtt: f64,
  pub stddev_rtt: f64,
  pub unit_rtt: String,
  pub unparsed_output: Vec<String>,
  pub raw_output: String,
}

/// Ping `address` `count` times and report parsed statistics.
pub fn ping(name: impl Into<String>, address: impl Into<String>, count: u32) -> Dispatcher {
  let name = name.into();
  let linux = Arc::new(PingLinux {
    name: name.clone(),
    address: address.into().trim().to_string(),
    count,
  });
  Dispatcher::new(name).linux(linux)
}

pub struct PingLinux {
  name: String,
  address: String,
  count: u32,
}

#[async_trait]
impl Task for PingLinux {
  fn name(&self) -> &str {
    &self.name
  }

  fn requirements(&self) -> Vec<String> {
    vec!["sudo apt-get install -y iputils-ping".to_string()]
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    let args = vec![
      self.address.clone(),
      "-c".to_string(),
      self.count.to_string(),
    ];
    run_command("ping", &args).await.map(|output| {
      let text = output.as_str().unwrap_or_default().to_string();
      let report = parse_ping_output(&self.address, &text);
      serde_json::to_value(report).unwrap_or(Value::Null)
    })
  }
}

fn parse_ping_output(host: &str, raw: &str) -> PingReport {
  try_parse(host, raw).unwrap_or_else(|| PingReport {
    host: host.to_string(),
    packets: Vec::new(),
    packet_loss: 100.0,
    min_rtt: 0.0,
    avg_rtt: 0.0,
    max_rtt: 0.0,
    stddev_rtt: 0.0,
    unit_rtt: String::new(),
    unparsed_output: Vec::new(),
    raw_output: raw.to_string(),
  })
}

fn try_parse(host: &str, raw: &str) -> Option<PingReport> {
  let mut lines: Vec<&str> = raw.lines().filter(|line| !line.trim().is_empty()).collect();

  // "rtt min/avg/max/mdev = 8.311/8.437/8.563/0.126 ms"
  let stats = lines.pop()?;
  let (_, rtts) = stats.split_once('=')?;
  let mut parts = rtts.trim().split(' ');
  let mut values = parts.next()?.split('/');
  let min_rtt: f64 = values.next()?.parse().ok()?;
  let avg_rtt: f64 = values.next()?.parse().ok()?;
  let max_rtt: f64 = values.next()?.parse().ok()?;
  let stddev_rtt: f64 = values.next()?.parse().ok()?;
  let unit_rtt = parts.next()?.to_string();

  // "2 packets transmitted, 2 received, 0% packet loss, time 1001ms"
  let counts = lines.pop()?;
  let mut fields = counts.split(',');
  let _transmitted = fields.next()?;
  let received: usize = fields.next()?.trim().split(' ').next()?.parse().ok()?;
  let packet_loss: f64 = fields.next()?.trim().split('%').next()?.parse().ok()?;

  // Drop the leading "PING host ..." banner and the trailing
  // "--- host ping statistics ---" separator.
  if lines.len() < 2 {
    return None;
  }
  let body = &lines[1..lines.len() - 1];

  let mut packets = Vec::new();
  for line in body.iter().take(received) {
    // "64 bytes from 8.8.8.8: icmp_seq=1 ttl=118 time=8.31 ms"
    let payload = line.splitn(2, ':').nth(1)?;
    let mut tokens = payload.split_whitespace();
    let icmp_seq = tokens.next()?.strip_prefix("icmp_seq=")?.parse().ok()?;
    let ttl = tokens.next()?.strip_prefix("ttl=")?.parse().ok()?;
    let time = tokens.next()?.strip_prefix("time=")?.parse().ok()?;
    let unit = tokens.next()?.to_string();
    packets.push(PacketReport {
      icmp_seq,
      ttl,
      time,
      unit,
    });
  }

  let unparsed_output = body
    .iter()
    .skip(received)
    .map(|line| line.to_string())
    .collect();

  Some(PingReport {
    host: host.to_string(),
    packets,
    packet_loss,
    min_rtt,
    avg_rtt,
    max_rtt,
    stddev_rtt,
    unit_rtt,
    unparsed_output,
    raw_output: raw.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  const TRANSCRIPT: &str = "\
PING 8.8.8.8 (8.8.8.8) 56(84) bytes of data.
64 bytes from 8.8.8.8: icmp_seq=1 ttl=118 time=8.31 ms
64 bytes from 8.8.8.8: icmp_seq=2 ttl=118 time=8.56 ms

--- 8.8.8.8 ping statistics ---
2 packets transmitted, 2 received, 0% packet loss, time 1001ms
rtt min/avg/max/mdev = 8.311/8.437/8.563/0.126 ms
";

  #[test]
  fn test_parse_full_transcript() {
    let report = parse_ping_output("8.8.8.8", TRANSCRIPT);

    assert_eq!(report.host, "8.8.8.8");
    assert_eq!(report.packet_loss, 0.0);
    assert_eq!(report.min_rtt, 8.311);
    assert_eq!(report.avg_rtt, 8.437);
    assert_eq!(report.max_rtt, 8.563);
    assert_eq!(report.stddev_rtt, 0.126);
    assert_eq!(report.unit_rtt, "ms");
    assert_eq!(report.packets.len(), 2);
    assert_eq!(report.packets[0].icmp_seq, 1);
    assert_eq!(report.packets[0].ttl, 118);
    assert_eq!(report.packets[0].time, 8.31);
    assert_eq!(report.packets[1].icmp_seq, 2);
    assert!(report.unparsed_output.is_empty());
  }

  #[test]
  fn test_parse_with_lost_packets() {
    let transcript = "\
PING example.com (93.184.216.34) 56(84) bytes of data.
64 bytes from 93.184.216.34: icmp_seq=1 ttl=56 time=92.1 ms

--- example.com ping statistics ---
2 packets transmitted, 1 received, 50% packet loss, time 1004ms
rtt min/avg/max/mdev = 92.100/92.100/92.100/0.000 ms
";
    let report = parse_ping_output("example.com", transcript);
    assert_eq!(report.packet_loss, 50.0);
    assert_eq!(report.packets.len(), 1);
  }

  #[test]
  fn test_unparseable_output_degrades_to_full_loss() {
    let report = parse_ping_output("8.8.8.8", "connect: Network is unreachable\n");
    assert_eq!(report.packet_loss, 100.0);
    assert!(report.packets.is_empty());
    assert_eq!(report.raw_output, "connect: Network is unreachable\n");
  }
}
