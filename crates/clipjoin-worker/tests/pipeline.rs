//! Job processor integration tests.
//!
//! A scripted media tool stands in for ffmpeg: trims write a small text
//! payload naming their source, concat joins the files listed in the manifest.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use clipjoin_media::{FfmpegCommand, MediaResult, MediaTool, ToolOutcome};
use clipjoin_models::{FadePolicy, Job};
use clipjoin_worker::{is_done, JobProcessor, WorkerConfig, WorkerError};

#[derive(Default)]
struct ScriptedTool {
    calls: Mutex<Vec<Vec<String>>>,
    fail_on_call: Option<usize>,
}

impl ScriptedTool {
    fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaTool for ScriptedTool {
    async fn execute(&self, cmd: &FfmpegCommand) -> MediaResult<ToolOutcome> {
        let args = cmd.build_args();
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(args.clone());
            calls.len() - 1
        };

        if self.fail_on_call == Some(call) {
            return Ok(ToolOutcome::failed(Some(1), "scripted failure"));
        }

        if args.iter().any(|a| a == "concat") {
            let manifest = tokio::fs::read_to_string(cmd.input()).await?;
            let dir = cmd.input().parent().unwrap_or(Path::new("."));
            let mut joined = Vec::new();
            for line in manifest.lines() {
                let name = line
                    .strip_prefix("file '")
                    .and_then(|s| s.strip_suffix('\''))
                    .expect("manifest line");
                joined.extend(tokio::fs::read(dir.join(name)).await?);
            }
            tokio::fs::write(cmd.output(), joined).await?;
        } else {
            let source = cmd.input().file_name().unwrap().to_string_lossy().to_string();
            tokio::fs::write(cmd.output(), format!("[{}]", source)).await?;
        }

        Ok(ToolOutcome::succeeded())
    }
}

struct Fixture {
    _dir: TempDir,
    source_root: PathBuf,
    output_root: PathBuf,
}

impl Fixture {
    async fn new(sources: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let source_root = dir.path().join("videos");
        let output_root = dir.path().join("out");
        tokio::fs::create_dir_all(&source_root).await.unwrap();
        for name in sources {
            tokio::fs::write(source_root.join(name), b"video").await.unwrap();
        }
        Self {
            _dir: dir,
            source_root,
            output_root,
        }
    }

    fn config(&self) -> WorkerConfig {
        WorkerConfig::default()
            .with_source_root(&self.source_root)
            .with_output_root(&self.output_root)
    }

    fn job_dir(&self, id: &str) -> PathBuf {
        self.output_root.join(id)
    }
}

fn job_with(id: &str, names: &[&str]) -> Job {
    let files: Vec<_> = names
        .iter()
        .map(|n| serde_json::json!({ "name": n, "start": 0, "end": 4, "fade": 1 }))
        .collect();
    serde_json::json!({ "UUID": id, "files": files })
        .to_string()
        .parse()
        .unwrap()
}

async fn list_dir(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    names
}

fn arg_after<'a>(args: &'a [String], flag: &str) -> &'a str {
    let i = args.iter().position(|a| a == flag).unwrap();
    &args[i + 1]
}

#[tokio::test]
async fn test_end_to_end_layout() {
    let fx = Fixture::new(&["a.mp4", "b.mp4"]).await;
    let tool = ScriptedTool::default();
    let processor = JobProcessor::new(fx.config(), tool);

    let job: Job = r#"{"UUID":"job1","files":[{"name":"a.mp4","start":0,"end":5,"fade":1},{"name":"b.mp4","start":2,"end":8,"fade":1}]}"#
        .parse()
        .unwrap();
    let output = processor.process(job).await.unwrap();

    let dir = fx.job_dir("job1");
    assert_eq!(output.output_dir, dir);
    assert_eq!(
        list_dir(&dir).await,
        ["0.intermediate.mp4", "1.intermediate.mp4", "DONE", "list.txt", "result.mp4"]
    );
    assert_eq!(
        output.intermediates,
        [dir.join("0.intermediate.mp4"), dir.join("1.intermediate.mp4")]
    );

    let manifest = tokio::fs::read_to_string(&output.manifest).await.unwrap();
    assert_eq!(manifest, "file '0.intermediate.mp4'\nfile '1.intermediate.mp4'\n");

    let result = tokio::fs::read_to_string(&output.result).await.unwrap();
    assert_eq!(result, "[a.mp4][b.mp4]");
    assert!(is_done(&dir).await);

    let calls = processor.tool().calls();
    assert_eq!(calls.len(), 3);

    assert_eq!(arg_after(&calls[0], "-i"), fx.source_root.join("a.mp4").to_string_lossy());
    assert_eq!(arg_after(&calls[0], "-vf"), "fade=in:st=0:d=1,fade=out:st=4:d=1");
    assert_eq!(arg_after(&calls[0], "-ss"), "0");
    assert_eq!(arg_after(&calls[0], "-to"), "5");
    assert!(calls[0].contains(&"-an".to_string()));
    assert!(calls[0].contains(&"-y".to_string()));

    assert_eq!(arg_after(&calls[1], "-i"), fx.source_root.join("b.mp4").to_string_lossy());
    assert_eq!(arg_after(&calls[1], "-vf"), "fade=in:st=2:d=1,fade=out:st=7:d=1");
    assert_eq!(arg_after(&calls[1], "-ss"), "2");
    assert_eq!(arg_after(&calls[1], "-to"), "8");

    assert_eq!(arg_after(&calls[2], "-f"), "concat");
    assert_eq!(arg_after(&calls[2], "-c"), "copy");
    assert!(calls[2].contains(&"-an".to_string()));
}

#[tokio::test]
async fn test_manifest_follows_clip_order_not_file_names() {
    // Twelve clips: lexical order of "10", "11", "2" differs from clip order
    let names: Vec<String> = (0..12).map(|i| format!("s{:02}.mp4", 11 - i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let fx = Fixture::new(&refs).await;
    let processor = JobProcessor::new(fx.config(), ScriptedTool::default());

    let output = processor.process(job_with("order", &refs)).await.unwrap();

    let manifest = tokio::fs::read_to_string(&output.manifest).await.unwrap();
    let expected: String = (0..12)
        .map(|i| format!("file '{}.intermediate.mp4'\n", i))
        .collect();
    assert_eq!(manifest, expected);

    let result = tokio::fs::read_to_string(&output.result).await.unwrap();
    let expected: String = names.iter().map(|n| format!("[{}]", n)).collect();
    assert_eq!(result, expected);
}

#[tokio::test]
async fn test_rerun_with_fewer_clips_drops_stale_intermediates() {
    let fx = Fixture::new(&["a.mp4", "b.mp4", "c.mp4"]).await;
    let processor = JobProcessor::new(fx.config(), ScriptedTool::default());

    processor
        .process(job_with("again", &["a.mp4", "b.mp4", "c.mp4"]))
        .await
        .unwrap();
    let output = processor.process(job_with("again", &["c.mp4"])).await.unwrap();

    assert_eq!(
        list_dir(&fx.job_dir("again")).await,
        ["0.intermediate.mp4", "DONE", "list.txt", "result.mp4"]
    );
    let manifest = tokio::fs::read_to_string(&output.manifest).await.unwrap();
    assert_eq!(manifest, "file '0.intermediate.mp4'\n");
    let result = tokio::fs::read_to_string(&output.result).await.unwrap();
    assert_eq!(result, "[c.mp4]");
}

#[tokio::test]
async fn test_missing_source_aborts_before_any_work() {
    let fx = Fixture::new(&["a.mp4"]).await;
    let processor = JobProcessor::new(fx.config(), ScriptedTool::default());

    let err = processor
        .process(job_with("missing", &["a.mp4", "gone.mp4"]))
        .await
        .unwrap_err();

    match err {
        WorkerError::MissingSources(paths) => {
            assert_eq!(paths, [fx.source_root.join("gone.mp4")]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(processor.tool().calls().is_empty());
    assert!(!fx.job_dir("missing").exists());
}

#[tokio::test]
async fn test_failed_trim_stops_job_without_marker() {
    let fx = Fixture::new(&["a.mp4", "b.mp4", "c.mp4"]).await;
    let processor = JobProcessor::new(fx.config(), ScriptedTool::failing_on(1));

    let err = processor
        .process(job_with("broken", &["a.mp4", "b.mp4", "c.mp4"]))
        .await
        .unwrap_err();

    assert_eq!(err.tool_stderr(), Some("scripted failure"));
    assert_eq!(processor.tool().calls().len(), 2, "no clip after the failure runs");
    assert!(!is_done(fx.job_dir("broken")).await);
    assert!(!fx.job_dir("broken").join("list.txt").exists());
}

#[tokio::test]
async fn test_failed_concat_leaves_no_marker() {
    let fx = Fixture::new(&["a.mp4", "b.mp4"]).await;
    let processor = JobProcessor::new(fx.config(), ScriptedTool::failing_on(2));

    let err = processor
        .process(job_with("noconcat", &["a.mp4", "b.mp4"]))
        .await
        .unwrap_err();

    assert_eq!(err.tool_stderr(), Some("scripted failure"));
    assert!(!is_done(fx.job_dir("noconcat")).await);
}

#[tokio::test]
async fn test_failed_rerun_clears_previous_marker() {
    let fx = Fixture::new(&["a.mp4"]).await;

    JobProcessor::new(fx.config(), ScriptedTool::default())
        .process(job_with("flaky", &["a.mp4"]))
        .await
        .unwrap();
    assert!(is_done(fx.job_dir("flaky")).await);

    let result = JobProcessor::new(fx.config(), ScriptedTool::failing_on(0))
        .process(job_with("flaky", &["a.mp4"]))
        .await;

    assert!(result.is_err());
    assert!(!is_done(fx.job_dir("flaky")).await);
}

#[tokio::test]
async fn test_reject_policy_fails_before_running_tool() {
    let fx = Fixture::new(&["a.mp4"]).await;
    let config = fx.config().with_fade_policy(FadePolicy::Reject);
    let processor = JobProcessor::new(config, ScriptedTool::default());

    let job: Job = r#"{"UUID":"tight","files":[{"name":"a.mp4","start":0,"end":1,"fade":1}]}"#
        .parse()
        .unwrap();
    let err = processor.process(job).await.unwrap_err();

    assert!(matches!(err, WorkerError::Model(_)));
    assert!(processor.tool().calls().is_empty());
    assert!(!is_done(fx.job_dir("tight")).await);
}

#[tokio::test]
async fn test_clamp_policy_shortens_fade() {
    let fx = Fixture::new(&["a.mp4"]).await;
    let config = fx.config().with_fade_policy(FadePolicy::Clamp);
    let processor = JobProcessor::new(config, ScriptedTool::default());

    let job: Job = r#"{"UUID":"tight","files":[{"name":"a.mp4","start":0,"end":1,"fade":1}]}"#
        .parse()
        .unwrap();
    processor.process(job).await.unwrap();

    let calls = processor.tool().calls();
    assert_eq!(arg_after(&calls[0], "-vf"), "fade=in:st=0:d=0.5,fade=out:st=0.5:d=0.5");
}

#[tokio::test]
async fn test_passthrough_policy_keeps_oversized_fade() {
    let fx = Fixture::new(&["a.mp4"]).await;
    let processor = JobProcessor::new(fx.config(), ScriptedTool::default());

    let job: Job = r#"{"UUID":"tight","files":[{"name":"a.mp4","start":0,"end":1,"fade":2}]}"#
        .parse()
        .unwrap();
    processor.process(job).await.unwrap();

    let calls = processor.tool().calls();
    assert_eq!(arg_after(&calls[0], "-vf"), "fade=in:st=0:d=2,fade=out:st=-1:d=2");
}

#[tokio::test]
async fn test_empty_job_is_rejected() {
    let fx = Fixture::new(&[]).await;
    let processor = JobProcessor::new(fx.config(), ScriptedTool::default());

    let job: Job = r#"{"UUID":"empty","files":[]}"#.parse().unwrap();
    let err = processor.process(job).await.unwrap_err();

    assert!(matches!(err, WorkerError::Media(_)));
    assert!(!fx.job_dir("empty").exists());
}

async fn sources_inside_job_dir(source_root: &Path, output_root: &Path) {
    tokio::fs::create_dir_all(source_root).await.unwrap();
    let source = source_root.join("a.mp4");
    tokio::fs::write(&source, b"video").await.unwrap();

    let config = WorkerConfig::default()
        .with_source_root(source_root)
        .with_output_root(output_root);
    let processor = JobProcessor::new(config, ScriptedTool::default());

    let err = processor
        .process(job_with("job1", &["a.mp4"]))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkerError::SourceInOutput { .. }), "{err}");
    assert!(source.exists(), "source must survive");
    assert!(processor.tool().calls().is_empty());
    assert!(!is_done(output_root.join("job1")).await);
}

#[tokio::test]
async fn test_sources_in_job_dir_are_never_wiped() {
    let dir = TempDir::new().unwrap();
    sources_inside_job_dir(&dir.path().join("job1"), dir.path()).await;
}

#[tokio::test]
async fn test_sources_below_job_dir_are_never_wiped() {
    let dir = TempDir::new().unwrap();
    sources_inside_job_dir(&dir.path().join("job1").join("raw"), dir.path()).await;
}

#[tokio::test]
async fn test_sources_next_to_job_dir_are_fine() {
    let dir = TempDir::new().unwrap();
    let source_root = dir.path().join("job1-sources");
    tokio::fs::create_dir_all(dir.path().join("job1")).await.unwrap();
    tokio::fs::create_dir_all(&source_root).await.unwrap();
    tokio::fs::write(source_root.join("a.mp4"), b"video").await.unwrap();

    let config = WorkerConfig::default()
        .with_source_root(&source_root)
        .with_output_root(dir.path());
    let output = JobProcessor::new(config, ScriptedTool::default())
        .process(job_with("job1", &["a.mp4"]))
        .await
        .unwrap();

    assert!(is_done(&output.output_dir).await);
    assert!(source_root.join("a.mp4").exists());
}

#[tokio::test]
async fn test_parent_dir_clip_name_is_rejected() {
    let fx = Fixture::new(&["a.mp4"]).await;
    let processor = JobProcessor::new(fx.config(), ScriptedTool::default());

    let err = processor
        .process(job_with("escape", &["a.mp4", "../../etc/passwd"]))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkerError::UnsafeClipName(_)));
    assert!(processor.tool().calls().is_empty());
    assert!(!fx.job_dir("escape").exists());
}

#[tokio::test]
async fn test_empty_job_is_rejected_before_resolution() {
    // A missing source root would fail the preflight if it ran
    let dir = TempDir::new().unwrap();
    let config = WorkerConfig::default()
        .with_source_root(dir.path().join("absent"))
        .with_output_root(dir.path());
    let processor = JobProcessor::new(config, ScriptedTool::default());

    let job: Job = r#"{"UUID":"empty","files":[]}"#.parse().unwrap();
    let err = processor.process(job).await.unwrap_err();

    assert!(matches!(
        err,
        WorkerError::Media(clipjoin_media::MediaError::EmptyManifest)
    ));
}
