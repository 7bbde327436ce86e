use crate::core::csv_sink::CsvSink;
use crate::core::{tabulator, ReportKind, ReportOutcome, ReportSource, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::{Local, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// `{context}_{kind}_{timestamp}`, without the `.csv` suffix.
pub fn report_name(context: &str, kind: ReportKind, at: NaiveDateTime) -> String {
    format!("{}_{}_{}", context, kind.label(), at.format(TIMESTAMP_FORMAT))
}

/// Runs one report driver through fetch, tabulate and write.
pub struct ReportEngine<S: Storage> {
    sink: CsvSink<S>,
    monitor: SystemMonitor,
}

impl<S: Storage> ReportEngine<S> {
    pub fn new(storage: S) -> Self {
        Self::new_with_monitoring(storage, false)
    }

    pub fn new_with_monitoring(storage: S, monitor_enabled: bool) -> Self {
        Self {
            sink: CsvSink::new(storage),
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run<R: ReportSource + ?Sized>(&self, source: &R) -> Result<ReportOutcome> {
        self.run_at(source, Local::now().naive_local()).await
    }

    /// Same as [`run`](Self::run) with an explicit timestamp for the file name.
    pub async fn run_at<R: ReportSource + ?Sized>(
        &self,
        source: &R,
        at: NaiveDateTime,
    ) -> Result<ReportOutcome> {
        let kind = source.kind();
        tracing::info!("📥 Fetching records for {} report ({})", kind, source.context());
        self.monitor.log_stats("Start");

        // 取資料失敗時直接回傳，不產生任何檔案
        let records = source.fetch().await?;
        tracing::info!("Fetched {} records", records.len());
        self.monitor.log_stats("Fetch");

        let table = tabulator::build(&records, &source.column_policy());
        tracing::debug!("Tabulated {} rows x {} columns", table.rows.len(), table.width());
        self.monitor.log_stats("Tabulate");

        let name = report_name(source.context(), kind, at);
        let output_path = self.sink.write(&table, &name).await?;
        self.monitor.log_stats("Write");

        tracing::info!("📁 {} report saved to {}", kind, output_path);
        Ok(ReportOutcome {
            kind,
            output_path,
            row_count: table.rows.len(),
        })
    }
}
