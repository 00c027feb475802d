//! Native scheduler membership of pods.
//!
//! Decided from the pod's tolerations alone. It does not look at the
//! node the pod landed on, so it can disagree with node ownership.

use nodegate_core::keys::{TAINT_SCHEDULER, TAINT_SCHEDULER_VALUE_MODERN};
use nodegate_core::text::eq_normalized;
use nodegate_state::Pod;

/// Returns true if the pod tolerates the scheduler taint with the native
/// scheduler value.
pub fn is_owned_by_modern_scheduler(pod: &Pod) -> bool {
    pod.spec.tolerations.iter().any(|toleration| {
        toleration.key.as_deref() == Some(TAINT_SCHEDULER)
            && toleration
                .value
                .as_deref()
                .is_some_and(|v| eq_normalized(v, TAINT_SCHEDULER_VALUE_MODERN))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegate_core::keys::TAINT_SCHEDULER_VALUE_LEGACY;
    use nodegate_state::Toleration;

    #[test]
    fn pod_without_tolerations() {
        assert!(!is_owned_by_modern_scheduler(&Pod::named("p1")));
    }

    #[test]
    fn pod_tolerating_native_scheduler() {
        let pod = Pod::named("p1").with_toleration(TAINT_SCHEDULER, "kubeScheduler");
        assert!(is_owned_by_modern_scheduler(&pod));
    }

    #[test]
    fn pod_tolerating_legacy_scheduler() {
        let pod = Pod::named("p1").with_toleration(TAINT_SCHEDULER, TAINT_SCHEDULER_VALUE_LEGACY);
        assert!(!is_owned_by_modern_scheduler(&pod));
    }

    #[test]
    fn other_keys_and_wildcards_do_not_count() {
        let mut pod = Pod::named("p1").with_toleration("dedicated", TAINT_SCHEDULER_VALUE_MODERN);
        pod.spec.tolerations.push(Toleration {
            key: Some(TAINT_SCHEDULER.to_string()),
            operator: Some("Exists".to_string()),
            value: None,
            effect: None,
        });
        assert!(!is_owned_by_modern_scheduler(&pod));
    }
}
