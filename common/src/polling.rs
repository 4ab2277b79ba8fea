//! エンリッチジョブのポーリング
//!
//! `queued/running` → (ループ) → `completed` | `failed`
//!
//! ステータス取得とスリープは呼び出し側から注入する
//! （ブラウザ: gloo timers、CLI: tokio、テスト: 何もしない）。
//! 最大回数・タイムアウトは設けない。取得自体が失敗したらループを抜け、再開はしない。

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use crate::error::Result;
use crate::types::{JobState, JobStatus};

/// ポーリング間隔（ミリ秒）
pub const POLL_INTERVAL_MS: u64 = 2000;

pub fn poll_interval() -> Duration {
    Duration::from_millis(POLL_INTERVAL_MS)
}

/// 進捗
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: u64,
    pub total: u64,
    pub percent: u8,
}

impl Progress {
    pub fn from_counts(processed: u64, total: u64) -> Self {
        Self {
            processed,
            total,
            percent: progress_percent(processed, total),
        }
    }

    /// 完了時（常に100%）
    pub fn complete(total: u64) -> Self {
        Self {
            processed: total,
            total,
            percent: 100,
        }
    }

    pub fn label(&self) -> String {
        if self.total == 0 {
            format!("{}%", self.percent)
        } else {
            format!("{}/{} ({}%)", self.processed, self.total, self.percent)
        }
    }
}

/// processed/total を0..=100に丸める（total=0なら0）
pub fn progress_percent(processed: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (processed.min(total) as f64 / total as f64 * 100.0).round();
    percent as u8
}

/// 1回分のステータスの評価結果
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    Continue(Progress),
    Completed(Option<Value>),
    Failed(String),
}

pub fn evaluate(status: &JobStatus) -> PollStep {
    match status.status {
        JobState::Completed => PollStep::Completed(status.result.clone()),
        JobState::Failed => PollStep::Failed(
            status
                .error
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "Enrichment failed".to_string()),
        ),
        _ => PollStep::Continue(Progress::from_counts(
            status.processed.unwrap_or(0),
            status.total.unwrap_or(0),
        )),
    }
}

/// ジョブの最終結果
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed { result: Option<Value> },
    Failed { error: String },
}

impl JobOutcome {
    /// エンリッチ結果の出力ファイル（`result.output_file`）
    pub fn output_file(&self) -> Option<&str> {
        match self {
            JobOutcome::Completed { result: Some(result) } => {
                result.get("output_file").and_then(Value::as_str)
            }
            _ => None,
        }
    }
}

/// ステータス取得の抽象
#[allow(async_fn_in_trait)]
pub trait JobStatusSource {
    async fn fetch_status(&self, job_id: &str) -> Result<JobStatus>;
}

/// 終端状態になるまでポーリングする
///
/// # Arguments
/// * `source` - ステータス取得
/// * `job_id` - ジョブID
/// * `interval` - 次のポーリングまでの待ち時間
/// * `sleep` - 待機関数
/// * `on_progress` - 進捗コールバック（完了時は100%で1回呼ばれる）
pub async fn poll_until_terminal<S, F, Fut, P>(
    source: &S,
    job_id: &str,
    interval: Duration,
    mut sleep: F,
    mut on_progress: P,
) -> Result<JobOutcome>
where
    S: JobStatusSource,
    F: FnMut(Duration) -> Fut,
    Fut: Future<Output = ()>,
    P: FnMut(Progress),
{
    let mut last_total = 0;
    loop {
        let status = source.fetch_status(job_id).await?;
        match evaluate(&status) {
            PollStep::Continue(progress) => {
                tracing::debug!(
                    job_id,
                    state = status.status.as_str(),
                    percent = progress.percent,
                    "job still running"
                );
                if progress.total > 0 {
                    last_total = progress.total;
                }
                on_progress(progress);
                sleep(interval).await;
            }
            PollStep::Completed(result) => {
                tracing::info!(job_id, "job completed");
                on_progress(Progress::complete(status.total.unwrap_or(last_total)));
                return Ok(JobOutcome::Completed { result });
            }
            PollStep::Failed(error) => {
                tracing::warn!(job_id, %error, "job failed");
                return Ok(JobOutcome::Failed { error });
            }
        }
    }
}

/// エンリッチ画面の表示状態
///
/// エンリッチを開始したら `Completed` を受け取るまでダウンロードボタンは出さない。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentView {
    /// エンリッチ開始済み（最初のステータス取得前も含む）
    pub started: bool,
    pub progress: Option<Progress>,
    pub download_ready: bool,
    pub output_file: Option<String>,
    pub error: Option<String>,
}

impl EnrichmentView {
    /// エンリッチ開始直後の状態
    pub fn started() -> Self {
        Self {
            started: true,
            ..Self::default()
        }
    }

    /// ダウンロードを出せるか
    ///
    /// 抽出直後（エンリッチ未開始）は生データ、開始後は完了時のみ。
    pub fn download_available(&self, has_job: bool) -> bool {
        has_job && (!self.started || self.download_ready)
    }

    pub fn apply(&mut self, step: &PollStep) {
        match step {
            PollStep::Continue(progress) => {
                self.progress = Some(*progress);
            }
            PollStep::Completed(result) => {
                let total = self.progress.map(|p| p.total).unwrap_or(0);
                self.progress = Some(Progress::complete(total));
                self.download_ready = true;
                self.output_file = result
                    .as_ref()
                    .and_then(|r| r.get("output_file"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            PollStep::Failed(error) => {
                self.error = Some(error.clone());
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.started && !self.download_ready && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// 決まった順にステータスを返すスタブ
    struct ScriptedSource {
        responses: RefCell<VecDeque<Result<JobStatus>>>,
        calls: Cell<usize>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<JobStatus>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: Cell::new(0),
            }
        }
    }

    impl JobStatusSource for ScriptedSource {
        async fn fetch_status(&self, _job_id: &str) -> Result<JobStatus> {
            self.calls.set(self.calls.get() + 1);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Transport("script exhausted".to_string())))
        }
    }

    fn status(state: JobState, processed: Option<u64>, total: Option<u64>) -> JobStatus {
        JobStatus {
            job_id: "job1".to_string(),
            job_type: "enrich".to_string(),
            status: state,
            processed,
            total,
            result: None,
            error: None,
        }
    }

    fn completed(output_file: &str) -> JobStatus {
        JobStatus {
            result: Some(serde_json::json!({ "output_file": output_file })),
            ..status(JobState::Completed, None, None)
        }
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(25, 100), 25);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(150, 100), 100);
    }

    #[test]
    fn test_progress_label() {
        assert_eq!(Progress::from_counts(25, 100).label(), "25/100 (25%)");
        assert_eq!(Progress::from_counts(0, 0).label(), "0%");
    }

    #[test]
    fn test_poll_reports_progress_then_completes() {
        let source = ScriptedSource::new(vec![
            Ok(status(JobState::Running, Some(25), Some(100))),
            Ok(status(JobState::Running, Some(80), Some(100))),
            Ok(completed("outputs/enriched_20260101.csv")),
        ]);
        let mut percents = Vec::new();
        let sleeps = Cell::new(0);

        let outcome = block_on(poll_until_terminal(
            &source,
            "job1",
            poll_interval(),
            |_| {
                sleeps.set(sleeps.get() + 1);
                async {}
            },
            |p| percents.push(p.percent),
        ))
        .unwrap();

        assert_eq!(percents, vec![25, 80, 100]);
        assert_eq!(sleeps.get(), 2);
        assert_eq!(source.calls.get(), 3);
        assert_eq!(outcome.output_file(), Some("outputs/enriched_20260101.csv"));
    }

    #[test]
    fn test_poll_stops_on_failure() {
        let source = ScriptedSource::new(vec![
            Ok(status(JobState::Queued, None, None)),
            Ok(JobStatus {
                error: Some("Companies House API rate limited".to_string()),
                ..status(JobState::Failed, None, None)
            }),
            Ok(completed("never.csv")),
        ]);

        let outcome = block_on(poll_until_terminal(
            &source,
            "job1",
            poll_interval(),
            |_| async {},
            |_| {},
        ))
        .unwrap();

        assert_eq!(
            outcome,
            JobOutcome::Failed {
                error: "Companies House API rate limited".to_string()
            }
        );
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn test_poll_network_error_is_not_resumed() {
        let source = ScriptedSource::new(vec![
            Ok(status(JobState::Running, Some(10), Some(100))),
            Err(Error::Transport("connection reset".to_string())),
            Ok(completed("never.csv")),
        ]);

        let result = block_on(poll_until_terminal(
            &source,
            "job1",
            poll_interval(),
            |_| async {},
            |_| {},
        ));

        assert!(matches!(result, Err(Error::Transport(_))));
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn test_failed_without_message_uses_default() {
        let step = evaluate(&status(JobState::Failed, None, None));
        assert_eq!(step, PollStep::Failed("Enrichment failed".to_string()));
    }

    #[test]
    fn test_view_reveals_download_only_after_completion() {
        let mut view = EnrichmentView::started();
        let sequence = [
            status(JobState::Running, Some(25), Some(100)),
            status(JobState::Running, Some(80), Some(100)),
            completed("outputs/enriched.parquet"),
        ];
        let mut seen = Vec::new();

        for s in &sequence {
            view.apply(&evaluate(s));
            seen.push((view.progress.map(|p| p.percent), view.download_ready));
        }

        assert_eq!(
            seen,
            vec![(Some(25), false), (Some(80), false), (Some(100), true)]
        );
        assert_eq!(view.output_file.as_deref(), Some("outputs/enriched.parquet"));
        assert!(!view.is_running());
    }

    #[test]
    fn test_view_failure_keeps_download_hidden() {
        let mut view = EnrichmentView::started();
        view.apply(&evaluate(&status(JobState::Running, Some(5), Some(10))));
        assert!(view.is_running());

        view.apply(&PollStep::Failed("boom".to_string()));
        assert!(!view.download_ready);
        assert!(!view.download_available(true));
        assert_eq!(view.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_download_hidden_before_first_status() {
        let view = EnrichmentView::started();
        assert!(view.progress.is_none());
        assert!(view.is_running());
        assert!(!view.download_available(true));
    }

    #[test]
    fn test_download_hidden_when_first_status_is_failed() {
        let mut view = EnrichmentView::started();
        view.apply(&evaluate(&status(JobState::Failed, None, None)));

        assert!(view.progress.is_none());
        assert!(!view.download_available(true));
        assert_eq!(view.error.as_deref(), Some("Enrichment failed"));
    }

    #[test]
    fn test_raw_download_before_enrichment() {
        let view = EnrichmentView::default();
        assert!(view.download_available(true));
        assert!(!view.download_available(false));
    }
}
