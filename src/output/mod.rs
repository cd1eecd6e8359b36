use crate::models::{Anomaly, Report};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Output handler for detection reports
pub struct OutputHandler {
    format: OutputFormat,
    writer: Option<Box<dyn Write + Send>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Jsonl,
    Console,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "jsonl" => OutputFormat::Jsonl,
            "console" => OutputFormat::Console,
            _ => OutputFormat::Json, // Default
        }
    }
}

impl OutputHandler {
    /// Create a new output handler writing to `file_path`, or stdout when `None`
    pub fn new(format: OutputFormat, file_path: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let writer: Option<Box<dyn Write + Send>> = match file_path {
            Some(path) => Some(Box::new(BufWriter::new(File::create(path)?))),
            None => None,
        };

        Ok(OutputHandler { format, writer })
    }

    /// Create a handler over an arbitrary writer
    pub fn with_writer(format: OutputFormat, writer: Box<dyn Write + Send>) -> Self {
        OutputHandler {
            format,
            writer: Some(writer),
        }
    }

    /// Write a detection report
    pub fn write_report(&mut self, report: &Report) -> Result<(), Box<dyn std::error::Error>> {
        let output = render(self.format, report)?;
        self.write_output(&output)
    }

    fn write_output(&mut self, data: &str) -> Result<(), Box<dyn std::error::Error>> {
        match &mut self.writer {
            Some(writer) => {
                writer.write_all(data.as_bytes())?;
                writer.flush()?;
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(data.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }

    /// Flush any buffered output
    pub fn flush(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(writer) = &mut self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Render a report in the given format, newline-terminated
pub fn render(format: OutputFormat, report: &Report) -> Result<String, serde_json::Error> {
    Ok(match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(report)?),
        OutputFormat::Jsonl => format!("{}\n", serde_json::to_string(report)?),
        OutputFormat::Console => render_console(report),
    })
}

fn render_console(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Suspicious events: {}\n",
        report.total_suspicious_events
    ));

    out.push_str(&format!("\nSuspicious IPs ({}):\n", report.suspicious_ips.len()));
    for ip in &report.suspicious_ips {
        out.push_str(&format!("  {}\n", ip));
    }

    out.push_str(&format!("\nBrute-force attacks ({}):\n", report.brute_force_attacks.len()));
    for (ip, count) in report.brute_force_attacks.iter() {
        out.push_str(&format!("  {} - {} failed login(s) in one window\n", ip, count));
    }

    out.push_str(&format!("\nEndpoints under attack ({}):\n", report.endpoints_under_attack.len()));
    for (endpoint, hits) in report.endpoints_under_attack.iter() {
        out.push_str(&format!("  {} - {} hit(s)\n", endpoint, hits));
    }

    out.push_str(&format!("\nAnomalies ({}):\n", report.anomalies.len()));
    for (key, anomaly) in report.anomalies.iter() {
        let detail = match anomaly {
            Anomaly::BlockedSignature { count } | Anomaly::ShortUserAgent { count } => {
                format!("count: {}", count)
            }
            Anomaly::HighResponseTime { value, mean, std } => {
                format!("value: {}ms, mean: {:.2}ms, std: {:.2}ms", value, mean, std)
            }
        };
        out.push_str(&format!("  [{}] {} - {}\n", anomaly.reason(), key, detail));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderedMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sample_report() -> Report {
        let brute: OrderedMap<usize> = vec![("9.9.9.9", 6)].into_iter().collect();
        let floods: OrderedMap<usize> = vec![("/api/login", 100)].into_iter().collect();
        let mut anomalies = OrderedMap::new();
        anomalies.insert("ua_short:bot", Anomaly::ShortUserAgent { count: 3 });
        anomalies.insert(
            "response_time:5.5.5.5",
            Anomaly::HighResponseTime { value: 100_000, mean: 9181.82, std: 28719.6 },
        );
        Report::new(vec!["9.9.9.9".to_string()], brute, floods, anomalies)
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from_str("JSONL"), OutputFormat::Jsonl);
        assert_eq!(OutputFormat::from_str("console"), OutputFormat::Console);
        assert_eq!(OutputFormat::from_str("yaml"), OutputFormat::Json);
    }

    #[test]
    fn test_json_keeps_slashes() {
        let out = render(OutputFormat::Json, &sample_report()).unwrap();
        assert!(out.contains("\"/api/login\": 100"));
        assert!(out.ends_with("}\n"));

        let parsed: Report = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, sample_report());
    }

    #[test]
    fn test_jsonl_single_line() {
        let out = render(OutputFormat::Jsonl, &sample_report()).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("{\"ips_sospechosas\":[\"9.9.9.9\"]"));
    }

    #[test]
    fn test_console_summary() {
        let out = render(OutputFormat::Console, &sample_report()).unwrap();
        assert!(out.starts_with("Suspicious events: 5\n"));
        assert!(out.contains("9.9.9.9 - 6 failed login(s) in one window"));
        assert!(out.contains("[short_user_agent] ua_short:bot - count: 3"));
        assert!(out.contains("[high_response_time] response_time:5.5.5.5 - value: 100000ms"));
    }

    #[test]
    fn test_write_report_to_custom_writer() {
        let buffer = SharedBuffer::default();
        let mut handler = OutputHandler::with_writer(OutputFormat::Jsonl, Box::new(buffer.clone()));
        handler.write_report(&sample_report()).unwrap();
        handler.write_report(&Report::default()).unwrap();

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(serde_json::from_str::<Report>(lines[0]).unwrap(), sample_report());
        assert!(lines[1].ends_with("\"total_eventos_sospechosos\":0}"));
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let mut handler = OutputHandler::new(OutputFormat::Json, Some(path.clone())).unwrap();
        handler.write_report(&sample_report()).unwrap();
        handler.flush().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: Report = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.total_suspicious_events, 5);
    }
}
