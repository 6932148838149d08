//! Build events and the observers that consume them.
use crate::data::dataset::RealNumber;
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// A decision taken while a tree is being grown.
///
/// One `NodeCreated` is emitted per node, followed later by exactly one of the
/// other three variants when that node is split.
#[derive(Clone, Debug, PartialEq)]
pub enum SplitEvent<T: RealNumber> {
    NodeCreated {
        id: String,
        depth: u16,
        n_samples: usize,
        mean: T,
        parent_rule: Option<String>,
        blocked_features: BTreeSet<String>,
    },
    MaxDepthReached {
        id: String,
        depth: u16,
        max_depth: u16,
    },
    NoSplitFound {
        id: String,
        depth: u16,
        min_samples_split: usize,
        eligible_features: Vec<String>,
    },
    BestSplitFound {
        id: String,
        depth: u16,
        feature: String,
        threshold: T,
        gain: T,
        left_child_id: String,
        right_child_id: String,
    },
}

impl<T: RealNumber> SplitEvent<T> {
    pub fn id(&self) -> &str {
        match self {
            SplitEvent::NodeCreated { id, .. }
            | SplitEvent::MaxDepthReached { id, .. }
            | SplitEvent::NoSplitFound { id, .. }
            | SplitEvent::BestSplitFound { id, .. } => id,
        }
    }

    pub fn depth(&self) -> u16 {
        match self {
            SplitEvent::NodeCreated { depth, .. }
            | SplitEvent::MaxDepthReached { depth, .. }
            | SplitEvent::NoSplitFound { depth, .. }
            | SplitEvent::BestSplitFound { depth, .. } => *depth,
        }
    }
}

impl<T: RealNumber> Display for SplitEvent<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let indent = "  ".repeat(usize::from(self.depth()));
        match self {
            SplitEvent::NodeCreated {
                id,
                depth,
                n_samples,
                mean,
                parent_rule,
                blocked_features,
            } => {
                let percent = mean.to_f64().unwrap_or(f64::NAN) * 100.0;
                write!(
                    f,
                    "{indent}node {id} (depth {depth}): {n_samples} samples, mean target {percent:.2}%"
                )?;
                if let Some(rule) = parent_rule {
                    write!(f, ", rule {rule}")?;
                }
                if !blocked_features.is_empty() {
                    let blocked: Vec<&str> = blocked_features.iter().map(String::as_str).collect();
                    write!(f, ", blocked [{}]", blocked.join(", "))?;
                }
                Ok(())
            }
            SplitEvent::MaxDepthReached { id, max_depth, .. } => {
                write!(f, "{indent}node {id}: maximum depth {max_depth} reached")
            }
            SplitEvent::NoSplitFound {
                id,
                min_samples_split,
                eligible_features,
                ..
            } => write!(
                f,
                "{indent}node {id}: no split leaves {min_samples_split} samples on both sides of [{}]",
                eligible_features.join(", ")
            ),
            SplitEvent::BestSplitFound {
                id,
                feature,
                threshold,
                gain,
                left_child_id,
                right_child_id,
                ..
            } => write!(
                f,
                "{indent}node {id}: split on {feature} at {threshold}, mean difference {:.3} -> {left_child_id} / {right_child_id}",
                gain.to_f64().unwrap_or(f64::NAN)
            ),
        }
    }
}

/// Receives every [`SplitEvent`] in the order the tree is grown.
pub trait SplitObserver<T: RealNumber> {
    fn on_event(&mut self, event: &SplitEvent<T>);
}

impl<T: RealNumber, F: FnMut(&SplitEvent<T>)> SplitObserver<T> for F {
    fn on_event(&mut self, event: &SplitEvent<T>) {
        self(event)
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl<T: RealNumber> SplitObserver<T> for NoopObserver {
    fn on_event(&mut self, _event: &SplitEvent<T>) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Clone, Debug, Default)]
pub struct EventTrace<T: RealNumber> {
    events: Vec<SplitEvent<T>>,
}

impl<T: RealNumber> EventTrace<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn events(&self) -> &[SplitEvent<T>] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SplitEvent<T>> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<T: RealNumber> SplitObserver<T> for EventTrace<T> {
    fn on_event(&mut self, event: &SplitEvent<T>) {
        self.events.push(event.clone());
    }
}

/// Forwards events to `tracing` as structured records.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl<T: RealNumber> SplitObserver<T> for TracingObserver {
    fn on_event(&mut self, event: &SplitEvent<T>) {
        match event {
            SplitEvent::NodeCreated {
                id,
                depth,
                n_samples,
                mean,
                parent_rule,
                blocked_features,
            } => tracing::info!(
                node = %id,
                depth = depth,
                n_samples = n_samples,
                mean = %mean,
                parent_rule = ?parent_rule,
                blocked = ?blocked_features,
                "Node created"
            ),
            SplitEvent::MaxDepthReached {
                id,
                depth,
                max_depth,
            } => tracing::info!(
                node = %id,
                depth = depth,
                max_depth = max_depth,
                "Maximum depth reached"
            ),
            SplitEvent::NoSplitFound {
                id,
                depth,
                min_samples_split,
                eligible_features,
            } => tracing::debug!(
                node = %id,
                depth = depth,
                min_samples_split = min_samples_split,
                eligible = ?eligible_features,
                "No split found"
            ),
            SplitEvent::BestSplitFound {
                id,
                depth,
                feature,
                threshold,
                gain,
                left_child_id,
                right_child_id,
            } => tracing::info!(
                node = %id,
                depth = depth,
                feature = %feature,
                threshold = %threshold,
                gain = %gain,
                left = %left_child_id,
                right = %right_child_id,
                "Best split found"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn best_split() -> SplitEvent<f64> {
        SplitEvent::BestSplitFound {
            id: "01".into(),
            depth: 1,
            feature: "x".into(),
            threshold: 20.0,
            gain: 1.0,
            left_child_id: "010".into(),
            right_child_id: "011".into(),
        }
    }

    #[test]
    fn test_event_accessors() {
        let event = best_split();
        assert_eq!(event.id(), "01");
        assert_eq!(event.depth(), 1);
    }

    #[test]
    fn test_node_created_display() {
        let event: SplitEvent<f64> = SplitEvent::NodeCreated {
            id: "00".into(),
            depth: 1,
            n_samples: 20,
            mean: 0.25,
            parent_rule: Some("x ≤ 20 → 00".into()),
            blocked_features: ["x".to_string()].into_iter().collect(),
        };
        assert_eq!(
            event.to_string(),
            "  node 00 (depth 1): 20 samples, mean target 25.00%, rule x ≤ 20 → 00, blocked [x]"
        );
    }

    #[test]
    fn test_best_split_display() {
        assert_eq!(
            best_split().to_string(),
            "  node 01: split on x at 20, mean difference 1.000 -> 010 / 011"
        );
    }

    #[test]
    fn test_event_trace_records_in_order() {
        let mut trace = EventTrace::new();
        assert!(trace.is_empty());

        trace.on_event(&best_split());
        trace.on_event(&SplitEvent::MaxDepthReached {
            id: "010".into(),
            depth: 2,
            max_depth: 2,
        });

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.events()[0], best_split());
        assert_eq!(trace.into_events()[1].id(), "010");
    }

    #[test]
    fn test_closure_observer() {
        let mut ids = Vec::new();
        {
            let mut observer = |event: &SplitEvent<f64>| ids.push(event.id().to_string());
            observer.on_event(&best_split());
        }
        assert_eq!(ids, vec!["01".to_string()]);
    }
}
