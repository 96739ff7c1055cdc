//! Job/step contract with the external job framework.
//!
//! The framework owns scheduling, retries and persistence. This side only
//! names the tracked operations and reports each step's input and output.

use crate::{DatabaseServer, Result};
use dbagent_types::{ArchiveReport, DbTarget, IndexReport, OffsiteConfig, UnindexReport};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPriority {
    Low,
    Normal,
    High,
}

/// A tracked unit of work as registered with the framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobSpec {
    pub name: &'static str,
    pub priority: JobPriority,
}

pub const ADD_BINLOGS_TO_INDEXER: JobSpec = JobSpec {
    name: "Add Binlogs To Indexer",
    priority: JobPriority::Low,
};

pub const REMOVE_BINLOGS_FROM_INDEXER: JobSpec = JobSpec {
    name: "Remove Binlogs From Indexer",
    priority: JobPriority::Low,
};

pub const UPLOAD_BINLOGS_TO_S3: JobSpec = JobSpec {
    name: "Upload Binlogs To S3",
    priority: JobPriority::Low,
};

pub const COLUMN_STATISTICS: JobSpec = JobSpec {
    name: "Column Statistics",
    priority: JobPriority::Normal,
};

pub const FETCH_COLUMN_STATISTICS_STEP: &str = "Fetch Column Statistics";

impl JobPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPriority::Low => "low",
            JobPriority::Normal => "normal",
            JobPriority::High => "high",
        }
    }
}

/// Receives the audit record of every step run under a job
pub trait StepRecorder: Send + Sync {
    fn record(&self, job: &JobSpec, step: &str, input: &Value, output: &Value);
}

/// Emits step records as `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRecorder;

impl StepRecorder for TracingRecorder {
    fn record(&self, job: &JobSpec, step: &str, input: &Value, output: &Value) {
        tracing::info!(
            job = job.name,
            priority = job.priority.as_str(),
            step,
            %input,
            %output,
            "step finished"
        );
    }
}

fn serialized<O: Serialize>(output: &O) -> Value {
    serde_json::to_value(output)
        .unwrap_or_else(|err| json!({ "error": format!("unserializable output: {}", err) }))
}

/// Run `f` as step `step` of `job`, recording its input and output.
pub fn run_step<O: Serialize>(
    recorder: &dyn StepRecorder,
    job: &JobSpec,
    step: &str,
    input: Value,
    f: impl FnOnce() -> O,
) -> O {
    let span = tracing::info_span!(
        "step",
        job = job.name,
        priority = job.priority.as_str(),
        name = step
    );
    let _guard = span.enter();

    let output = f();
    recorder.record(job, step, &input, &serialized(&output));
    output
}

/// Like [`run_step`], recording `{"error": ...}` when the step fails.
pub fn try_run_step<O: Serialize>(
    recorder: &dyn StepRecorder,
    job: &JobSpec,
    step: &str,
    input: Value,
    f: impl FnOnce() -> Result<O>,
) -> Result<O> {
    let span = tracing::info_span!(
        "step",
        job = job.name,
        priority = job.priority.as_str(),
        name = step
    );
    let _guard = span.enter();

    let output = f();
    let recorded = match &output {
        Ok(value) => serialized(value),
        Err(err) => json!({ "error": err.to_string() }),
    };
    recorder.record(job, step, &input, &recorded);
    output
}

impl DatabaseServer {
    pub fn add_binlogs_to_index_job(
        &self,
        recorder: &dyn StepRecorder,
        binlogs: &[String],
    ) -> IndexReport {
        let job = &ADD_BINLOGS_TO_INDEXER;
        run_step(recorder, job, job.name, json!({ "binlogs": binlogs }), || {
            self.add_binlogs_to_index(binlogs)
        })
    }

    pub fn remove_binlogs_from_index_job(
        &self,
        recorder: &dyn StepRecorder,
        binlogs: &[String],
    ) -> UnindexReport {
        let job = &REMOVE_BINLOGS_FROM_INDEXER;
        run_step(recorder, job, job.name, json!({ "binlogs": binlogs }), || {
            self.remove_binlogs_from_index(binlogs)
        })
    }

    pub fn upload_binlogs_to_s3_job(
        &self,
        recorder: &dyn StepRecorder,
        binlogs: &[String],
        offsite: &OffsiteConfig,
    ) -> Result<ArchiveReport> {
        let job = &UPLOAD_BINLOGS_TO_S3;
        // Credentials stay out of the audit record
        let input = json!({ "binlogs": binlogs, "bucket": offsite.bucket, "path": offsite.path });
        try_run_step(recorder, job, job.name, input, || {
            self.upload_binlogs_to_s3(binlogs, offsite)
        })
    }

    pub fn column_statistics_job(
        &self,
        recorder: &dyn StepRecorder,
        schema: &str,
        table: &str,
        target: &DbTarget,
        doc_name: &str,
    ) -> Result<Value> {
        let input = json!({ "schema": schema, "table": table, "host": target.host });
        try_run_step(
            recorder,
            &COLUMN_STATISTICS,
            FETCH_COLUMN_STATISTICS_STEP,
            input,
            || self.column_statistics(target, schema, table),
        )?;
        Ok(json!({ "doc_name": doc_name }))
    }
}
