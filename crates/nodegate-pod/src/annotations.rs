//! Pod annotation codec.
//!
//! Builds the annotation map written onto a pod at task launch, and reads
//! the same facts back from a running pod. Encoding is best-effort: a
//! failure in one annotation never loses the others.
//!
//! # Layout
//!
//! ```text
//! <passthrough attributes>          copied as-is
//! <contributor annotations>         performance tooling, opaque here
//! containerInfo                     base64(payload)
//! predictions.../runtime            "<seconds>s"
//! opportunistic.../cpu, .../id      plain strings from the task context
//! jobDescriptor                     base64(gzip(canonical JSON))
//! ```

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::{debug, error, warn};

use nodegate_core::config::{AnnotationsConfig, DEFAULT_MAX_ANNOTATION_BYTES};
use nodegate_core::keys::*;
use nodegate_core::text::non_blank;
use nodegate_state::{Job, JobDescriptor, Task};

use crate::error::{CodecError, CodecResult};

/// Largest decompressed job descriptor accepted when reading a pod.
pub const MAX_DECODED_DESCRIPTOR_BYTES: usize = 16 * DEFAULT_MAX_ANNOTATION_BYTES;

/// Source of extra annotations derived from a job, such as performance
/// tooling settings.
pub trait AnnotationContributor: Send + Sync {
    fn annotations(&self, job: &Job) -> HashMap<String, String>;
}

/// Textual rendering of a job descriptor before compression.
pub trait DescriptorFormat: Send + Sync {
    fn render(&self, descriptor: &JobDescriptor) -> CodecResult<String>;
}

/// Compact JSON with map keys in sorted order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDescriptorFormat;

impl DescriptorFormat for JsonDescriptorFormat {
    fn render(&self, descriptor: &JobDescriptor) -> CodecResult<String> {
        serde_json::to_string(descriptor).map_err(|e| CodecError::Serialize(e.to_string()))
    }
}

/// Opportunistic CPU facts carried on a pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpportunisticResources {
    pub cpu_count: Option<String>,
    pub allocation_id: Option<String>,
}

/// Builds pod annotations from a job and task.
#[derive(Clone)]
pub struct AnnotationCodec {
    contributors: Vec<Arc<dyn AnnotationContributor>>,
    format: Arc<dyn DescriptorFormat>,
    max_total_bytes: usize,
}

impl Default for AnnotationCodec {
    fn default() -> Self {
        Self {
            contributors: Vec::new(),
            format: Arc::new(JsonDescriptorFormat),
            max_total_bytes: DEFAULT_MAX_ANNOTATION_BYTES,
        }
    }
}

impl std::fmt::Debug for AnnotationCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationCodec")
            .field("contributors", &self.contributors.len())
            .field("max_total_bytes", &self.max_total_bytes)
            .finish()
    }
}

impl AnnotationCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AnnotationsConfig) -> Self {
        Self::default().with_max_total_bytes(config.max_total_bytes)
    }

    pub fn with_contributor(mut self, contributor: Arc<dyn AnnotationContributor>) -> Self {
        self.contributors.push(contributor);
        self
    }

    pub fn with_descriptor_format(mut self, format: Arc<dyn DescriptorFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_max_total_bytes(mut self, max_total_bytes: usize) -> Self {
        self.max_total_bytes = max_total_bytes;
        self
    }

    pub fn max_total_bytes(&self) -> usize {
        self.max_total_bytes
    }

    /// Build the annotation map for a task's pod.
    ///
    /// The job descriptor is added last and only if it encodes and fits
    /// the size budget. Everything else is always returned.
    pub fn build(
        &self,
        job: &Job,
        task: &Task,
        container_info: &[u8],
        passthrough: &HashMap<String, String>,
        include_job_descriptor: bool,
    ) -> HashMap<String, String> {
        let mut annotations = passthrough.clone();
        for contributor in &self.contributors {
            annotations.extend(contributor.annotations(job));
        }
        annotations.insert(ANNOTATION_CONTAINER_INFO.to_string(), BASE64.encode(container_info));

        if let Some(runtime) = job.attribute(JOB_ATTRIBUTE_RUNTIME_PREDICTION_SEC) {
            annotations.insert(
                ANNOTATION_RUNTIME_PREDICTION.to_string(),
                format!("{runtime}{RUNTIME_PREDICTION_UNIT}"),
            );
        }
        if let Some(count) = task.context(TASK_ATTRIBUTE_OPPORTUNISTIC_CPU_COUNT) {
            annotations.insert(ANNOTATION_OPPORTUNISTIC_CPU_COUNT.to_string(), count.to_string());
        }
        if let Some(id) = task.context(TASK_ATTRIBUTE_OPPORTUNISTIC_CPU_ALLOCATION) {
            annotations.insert(ANNOTATION_OPPORTUNISTIC_ID.to_string(), id.to_string());
        }

        let base_size = annotations_size(&annotations);
        if base_size > self.max_total_bytes {
            warn!(
                task = %task.id,
                size = base_size,
                limit = self.max_total_bytes,
                "pod annotations exceed budget before job descriptor"
            );
        }

        if include_job_descriptor {
            match self.encode_within_budget(&job.descriptor, base_size) {
                Ok(encoded) => {
                    annotations.insert(ANNOTATION_JOB_DESCRIPTOR.to_string(), encoded);
                }
                Err(e @ CodecError::TooLarge { .. }) => {
                    warn!(task = %task.id, error = %e, "job descriptor annotation omitted");
                }
                Err(e) => {
                    error!(job = %job.id, task = %task.id, error = %e, "unable to encode job descriptor");
                }
            }
        }

        debug!(task = %task.id, count = annotations.len(), "built pod annotations");
        annotations
    }

    fn encode_within_budget(&self, descriptor: &JobDescriptor, used: usize) -> CodecResult<String> {
        let encoded = self.encode_job_descriptor(descriptor)?;
        let size = used + ANNOTATION_JOB_DESCRIPTOR.len() + encoded.len();
        if size > self.max_total_bytes {
            return Err(CodecError::TooLarge {
                size,
                limit: self.max_total_bytes,
            });
        }
        Ok(encoded)
    }

    /// Render, gzip, and base64-encode a job descriptor.
    pub fn encode_job_descriptor(&self, descriptor: &JobDescriptor) -> CodecResult<String> {
        let text = self.format.render(descriptor)?;
        gzip_and_base64_encode(&text)
    }
}

/// [`AnnotationCodec::build`] with the default codec.
pub fn build_annotations(
    job: &Job,
    task: &Task,
    container_info: &[u8],
    passthrough: &HashMap<String, String>,
    include_job_descriptor: bool,
) -> HashMap<String, String> {
    AnnotationCodec::default().build(job, task, container_info, passthrough, include_job_descriptor)
}

/// Total size of an annotation map as counted by the control plane.
pub fn annotations_size(annotations: &HashMap<String, String>) -> usize {
    annotations.iter().map(|(k, v)| k.len() + v.len()).sum()
}

pub fn gzip_and_base64_encode(text: &str) -> CodecResult<String> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(BASE64.encode(compressed))
}

/// Inverse of [`gzip_and_base64_encode`], stopping once the decompressed
/// text passes `limit` bytes.
pub fn base64_and_gunzip_decode(encoded: &str, limit: usize) -> CodecResult<String> {
    let compressed = BASE64.decode(encoded.trim())?;
    let mut bytes = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .take(limit as u64 + 1)
        .read_to_end(&mut bytes)?;
    if bytes.len() > limit {
        return Err(CodecError::DecompressedTooLarge { limit });
    }
    String::from_utf8(bytes).map_err(|e| CodecError::Deserialize(e.to_string()))
}

// ── Decoding ──────────────────────────────────────────────────────

/// Raw container info payload, if present.
pub fn decode_container_info(annotations: &HashMap<String, String>) -> CodecResult<Option<Vec<u8>>> {
    annotations
        .get(ANNOTATION_CONTAINER_INFO)
        .map(|v| BASE64.decode(v.trim()).map_err(CodecError::from))
        .transpose()
}

/// Job descriptor, if present.
///
/// The decompressed text is capped at [`MAX_DECODED_DESCRIPTOR_BYTES`].
pub fn decode_job_descriptor(annotations: &HashMap<String, String>) -> CodecResult<Option<JobDescriptor>> {
    decode_job_descriptor_within(annotations, MAX_DECODED_DESCRIPTOR_BYTES)
}

/// [`decode_job_descriptor`] with an explicit cap on the decompressed text.
pub fn decode_job_descriptor_within(
    annotations: &HashMap<String, String>,
    limit: usize,
) -> CodecResult<Option<JobDescriptor>> {
    let Some(encoded) = annotations.get(ANNOTATION_JOB_DESCRIPTOR) else {
        return Ok(None);
    };
    let text = base64_and_gunzip_decode(encoded, limit)?;
    let descriptor =
        serde_json::from_str(&text).map_err(|e| CodecError::Deserialize(e.to_string()))?;
    Ok(Some(descriptor))
}

/// Predicted runtime, if present and a non-negative number of seconds.
pub fn decode_runtime_prediction(annotations: &HashMap<String, String>) -> Option<Duration> {
    let value = annotations.get(ANNOTATION_RUNTIME_PREDICTION)?.trim();
    let seconds = value.strip_suffix(RUNTIME_PREDICTION_UNIT).unwrap_or(value);
    seconds
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
}

/// Opportunistic CPU facts, if either annotation is present.
pub fn decode_opportunistic_resources(
    annotations: &HashMap<String, String>,
) -> Option<OpportunisticResources> {
    let lookup = |key: &str| non_blank(annotations.get(key).map(String::as_str)).map(str::to_string);
    let resources = OpportunisticResources {
        cpu_count: lookup(ANNOTATION_OPPORTUNISTIC_CPU_COUNT),
        allocation_id: lookup(ANNOTATION_OPPORTUNISTIC_ID),
    };
    (resources.cpu_count.is_some() || resources.allocation_id.is_some()).then_some(resources)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingFormat;

    impl DescriptorFormat for FailingFormat {
        fn render(&self, _descriptor: &JobDescriptor) -> CodecResult<String> {
            Err(CodecError::Serialize("unsupported field".to_string()))
        }
    }

    struct PerfTool;

    impl AnnotationContributor for PerfTool {
        fn annotations(&self, job: &Job) -> HashMap<String, String> {
            HashMap::from([("perf.nodegate.io/app".to_string(), job.descriptor.application_name.clone())])
        }
    }

    fn sample_job() -> Job {
        let mut descriptor = JobDescriptor {
            application_name: "encoder".to_string(),
            ..JobDescriptor::default()
        };
        descriptor
            .attributes
            .insert(JOB_ATTRIBUTE_RUNTIME_PREDICTION_SEC.to_string(), "42.5".to_string());
        descriptor.container.image.name = "media/encoder".to_string();
        Job::new("job-1", descriptor)
    }

    fn sample_task() -> Task {
        let mut task = Task::new("task-1", "job-1");
        task.task_context
            .insert(TASK_ATTRIBUTE_OPPORTUNISTIC_CPU_COUNT.to_string(), "4".to_string());
        task.task_context
            .insert(TASK_ATTRIBUTE_OPPORTUNISTIC_CPU_ALLOCATION.to_string(), "alloc-7".to_string());
        task
    }

    fn passthrough() -> HashMap<String, String> {
        HashMap::from([("team".to_string(), "media".to_string())])
    }

    #[test]
    fn builds_every_annotation() {
        let annotations = build_annotations(&sample_job(), &sample_task(), b"payload", &passthrough(), true);

        assert_eq!(annotations["team"], "media");
        assert_eq!(annotations[ANNOTATION_CONTAINER_INFO], BASE64.encode(b"payload"));
        assert_eq!(annotations[ANNOTATION_RUNTIME_PREDICTION], "42.5s");
        assert_eq!(annotations[ANNOTATION_OPPORTUNISTIC_CPU_COUNT], "4");
        assert_eq!(annotations[ANNOTATION_OPPORTUNISTIC_ID], "alloc-7");
        assert!(annotations.contains_key(ANNOTATION_JOB_DESCRIPTOR));
    }

    #[test]
    fn optional_annotations_are_skipped() {
        let job = Job::new("job-2", JobDescriptor::default());
        let task = Task::new("task-2", "job-2");
        let annotations = build_annotations(&job, &task, b"", &HashMap::new(), false);

        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[ANNOTATION_CONTAINER_INFO], "");
    }

    #[test]
    fn descriptor_failure_keeps_other_annotations() {
        let codec = AnnotationCodec::new().with_descriptor_format(Arc::new(FailingFormat));
        let annotations = codec.build(&sample_job(), &sample_task(), b"payload", &passthrough(), true);

        assert!(!annotations.contains_key(ANNOTATION_JOB_DESCRIPTOR));
        assert_eq!(annotations["team"], "media");
        assert!(annotations.contains_key(ANNOTATION_CONTAINER_INFO));
        assert!(annotations.contains_key(ANNOTATION_RUNTIME_PREDICTION));
    }

    #[test]
    fn descriptor_over_budget_is_omitted() {
        let codec = AnnotationCodec::new().with_max_total_bytes(64);
        let annotations = codec.build(&sample_job(), &sample_task(), b"payload", &passthrough(), true);

        assert!(!annotations.contains_key(ANNOTATION_JOB_DESCRIPTOR));
        assert!(annotations.contains_key(ANNOTATION_OPPORTUNISTIC_ID));
    }

    #[test]
    fn contributor_annotations_are_merged() {
        let codec = AnnotationCodec::new().with_contributor(Arc::new(PerfTool));
        let annotations = codec.build(&sample_job(), &sample_task(), b"", &passthrough(), false);
        assert_eq!(annotations["perf.nodegate.io/app"], "encoder");
    }

    #[test]
    fn fixed_keys_override_passthrough() {
        let passthrough = HashMap::from([(ANNOTATION_CONTAINER_INFO.to_string(), "stale".to_string())]);
        let annotations = build_annotations(&sample_job(), &sample_task(), b"x", &passthrough, false);
        assert_eq!(annotations[ANNOTATION_CONTAINER_INFO], BASE64.encode(b"x"));
    }

    #[test]
    fn decodes_what_was_encoded() {
        let job = sample_job();
        let annotations = build_annotations(&job, &sample_task(), b"payload", &passthrough(), true);

        assert_eq!(decode_container_info(&annotations).unwrap(), Some(b"payload".to_vec()));
        assert_eq!(decode_job_descriptor(&annotations).unwrap(), Some(job.descriptor));
        assert_eq!(decode_runtime_prediction(&annotations), Some(Duration::from_millis(42_500)));
        assert_eq!(
            decode_opportunistic_resources(&annotations),
            Some(OpportunisticResources {
                cpu_count: Some("4".to_string()),
                allocation_id: Some("alloc-7".to_string()),
            })
        );
    }

    #[test]
    fn decoding_absent_annotations() {
        let empty = HashMap::new();
        assert_eq!(decode_container_info(&empty).unwrap(), None);
        assert_eq!(decode_job_descriptor(&empty).unwrap(), None);
        assert_eq!(decode_runtime_prediction(&empty), None);
        assert_eq!(decode_opportunistic_resources(&empty), None);
    }

    #[test]
    fn corrupt_job_descriptor_is_an_error() {
        let annotations = HashMap::from([(ANNOTATION_JOB_DESCRIPTOR.to_string(), "not base64!".to_string())]);
        assert!(matches!(decode_job_descriptor(&annotations), Err(CodecError::Base64(_))));

        let not_gzip = HashMap::from([(ANNOTATION_JOB_DESCRIPTOR.to_string(), BASE64.encode(b"plain"))]);
        assert!(matches!(decode_job_descriptor(&not_gzip), Err(CodecError::Compression(_))));
    }

    #[test]
    fn runtime_prediction_rejects_garbage() {
        let annotations = HashMap::from([(ANNOTATION_RUNTIME_PREDICTION.to_string(), "soon".to_string())]);
        assert_eq!(decode_runtime_prediction(&annotations), None);

        let negative = HashMap::from([(ANNOTATION_RUNTIME_PREDICTION.to_string(), "-3s".to_string())]);
        assert_eq!(decode_runtime_prediction(&negative), None);
    }

    #[test]
    fn gzip_round_trip_handles_unicode() {
        let encoded = gzip_and_base64_encode("zone=eu-west-1a ✓").unwrap();
        assert_eq!(base64_and_gunzip_decode(&encoded, 64).unwrap(), "zone=eu-west-1a ✓");
    }

    #[test]
    fn compressed_descriptor_expanding_past_limit_is_rejected() {
        let padding = " ".repeat(MAX_DECODED_DESCRIPTOR_BYTES * 2);
        let encoded = gzip_and_base64_encode(&padding).unwrap();
        let annotations = HashMap::from([(ANNOTATION_JOB_DESCRIPTOR.to_string(), encoded)]);
        assert!(annotations_size(&annotations) <= DEFAULT_MAX_ANNOTATION_BYTES);

        assert!(matches!(
            decode_job_descriptor(&annotations),
            Err(CodecError::DecompressedTooLarge { limit }) if limit == MAX_DECODED_DESCRIPTOR_BYTES
        ));
    }

    #[test]
    fn decode_limit_is_inclusive() {
        let encoded = gzip_and_base64_encode("abcd").unwrap();
        assert_eq!(base64_and_gunzip_decode(&encoded, 4).unwrap(), "abcd");
        assert!(matches!(
            base64_and_gunzip_decode(&encoded, 3),
            Err(CodecError::DecompressedTooLarge { limit: 3 })
        ));
    }

    #[test]
    fn descriptor_decode_honours_explicit_limit() {
        let annotations = build_annotations(&sample_job(), &sample_task(), b"", &HashMap::new(), true);
        assert!(matches!(
            decode_job_descriptor_within(&annotations, 8),
            Err(CodecError::DecompressedTooLarge { limit: 8 })
        ));
        assert!(decode_job_descriptor_within(&annotations, MAX_DECODED_DESCRIPTOR_BYTES)
            .unwrap()
            .is_some());
    }

    #[test]
    fn size_counts_keys_and_values() {
        let annotations = HashMap::from([("ab".to_string(), "cde".to_string())]);
        assert_eq!(annotations_size(&annotations), 5);
    }
}
