use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Host-wide CPU utilisation over a blocking sample window
pub trait CpuSampler: Send + Sync {
    /// Busy percentage (0.0 - 100.0) across all cores during `window`
    fn cpu_percent(&self, window: Duration) -> Result<f32>;
}

/// Reads the aggregate `cpu` line of `/proc/stat` before and after the window
#[derive(Debug, Clone)]
pub struct ProcStatSampler {
    path: PathBuf,
}

impl Default for ProcStatSampler {
    fn default() -> Self {
        Self::new("/proc/stat")
    }
}

impl ProcStatSampler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<CpuTimes> {
        let content = std::fs::read_to_string(&self.path)?;
        CpuTimes::parse(&content).ok_or_else(|| {
            Error::Cpu(format!("no aggregate cpu line in {}", self.path.display()))
        })
    }
}

impl CpuSampler for ProcStatSampler {
    fn cpu_percent(&self, window: Duration) -> Result<f32> {
        let before = self.read()?;
        std::thread::sleep(window);
        let after = self.read()?;
        Ok(before.busy_percent(&after))
    }
}

/// Cumulative jiffies from the aggregate `cpu` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub idle: u64,
    pub total: u64,
}

impl CpuTimes {
    /// Parse `cpu  user nice system idle iowait irq softirq steal [guest guest_nice]`.
    ///
    /// Guest time is already included in user/nice, so only the first eight
    /// fields count towards the total. iowait counts as idle.
    pub fn parse(content: &str) -> Option<Self> {
        let line = content
            .lines()
            .find(|line| line.split_whitespace().next() == Some("cpu"))?;

        let fields: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .take(8)
            .map(|field| field.parse().ok())
            .collect::<Option<Vec<_>>>()?;

        if fields.len() < 4 {
            return None;
        }

        let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
        let total = fields.iter().sum();
        Some(Self { idle, total })
    }

    pub fn busy_percent(&self, later: &CpuTimes) -> f32 {
        let total = later.total.saturating_sub(self.total);
        if total == 0 {
            return 0.0;
        }
        let idle = later.idle.saturating_sub(self.idle).min(total);
        ((total - idle) as f64 * 100.0 / total as f64) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const STAT: &str = "cpu  100 0 100 700 100 0 0 0 0 0\n\
                        cpu0 50 0 50 350 50 0 0 0 0 0\n\
                        intr 12345\n";

    #[test]
    fn test_parse_aggregate_line_only() {
        let times = CpuTimes::parse(STAT).unwrap();
        assert_eq!(times.idle, 800);
        assert_eq!(times.total, 1000);
    }

    #[test]
    fn test_parse_rejects_missing_cpu_line() {
        assert!(CpuTimes::parse("intr 1\nctxt 2\n").is_none());
    }

    #[test]
    fn test_busy_percent_between_samples() {
        let before = CpuTimes {
            idle: 800,
            total: 1000,
        };
        let after = CpuTimes {
            idle: 1100,
            total: 2000,
        };
        // 1000 jiffies elapsed, 300 idle
        assert!((before.busy_percent(&after) - 70.0).abs() < 0.01);
    }

    #[test]
    fn test_busy_percent_without_elapsed_time_is_zero() {
        let times = CpuTimes {
            idle: 10,
            total: 10,
        };
        assert_eq!(times.busy_percent(&times), 0.0);
    }

    #[test]
    fn test_sampler_reads_configured_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(STAT.as_bytes()).unwrap();

        let sampler = ProcStatSampler::new(file.path());
        // Same file twice: no elapsed jiffies
        let percent = sampler.cpu_percent(Duration::from_millis(1)).unwrap();
        assert_eq!(percent, 0.0);
    }
}
