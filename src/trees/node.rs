//! Splitter node
use super::{
    events::{SplitEvent, SplitObserver},
    params::SplitterParams,
    splitter::find_best_split,
};
use crate::{
    data::dataset::{Dataset, RealNumber},
    error::SplitterError,
};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// Id of the root node.
pub const ROOT_ID: &str = "0";

/// Which side of its parent's threshold a node sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// The inequality that routed rows from a parent into a child.
#[derive(Clone, Debug, PartialEq)]
pub struct ParentRule<T: RealNumber> {
    pub feature: String,
    pub threshold: T,
    pub side: Side,
    pub child_id: String,
}

impl<T: RealNumber> Display for ParentRule<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let op = match self.side {
            Side::Left => "≤",
            Side::Right => ">",
        };
        write!(f, "{} {} {} → {}", self.feature, op, self.threshold, self.child_id)
    }
}

/// Why a node stopped splitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafReason {
    MaxDepth,
    NoSplitFound,
}

/// Split state of a node. Set once by [`SplitterNode::split`].
#[derive(Clone, Debug)]
pub enum SplitOutcome<T: RealNumber> {
    Pending,
    Leaf(LeafReason),
    Internal {
        feature: String,
        threshold: T,
        gain: T,
        left: Box<SplitterNode<T>>,
        right: Box<SplitterNode<T>>,
    },
}

/// Where a node sits in the tree. The default describes the root.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeContext<T: RealNumber> {
    pub id: String,
    pub depth: u16,
    pub blocked_features: BTreeSet<String>,
    pub parent_rule: Option<ParentRule<T>>,
}

impl<T: RealNumber> Default for NodeContext<T> {
    fn default() -> Self {
        Self {
            id: ROOT_ID.to_string(),
            depth: 0,
            blocked_features: BTreeSet::new(),
            parent_rule: None,
        }
    }
}

/// One node of a regression tree, owning its rows and its children.
#[derive(Clone, Debug)]
pub struct SplitterNode<T: RealNumber> {
    id: String,
    depth: u16,
    target: String,
    target_index: usize,
    params: SplitterParams,
    data: Dataset<T>,
    blocked_features: BTreeSet<String>,
    parent_rule: Option<ParentRule<T>>,
    mean: T,
    n_samples: usize,
    outcome: SplitOutcome<T>,
}

impl<T: RealNumber> SplitterNode<T> {
    /// Creates a root node over the whole dataset.
    pub fn root(
        data: Dataset<T>,
        target: &str,
        params: &SplitterParams,
        observer: &mut dyn SplitObserver<T>,
    ) -> Result<Self, SplitterError> {
        Self::new(data, target, NodeContext::default(), params, observer)
    }

    /// Creates a node and emits [`SplitEvent::NodeCreated`]. No splitting happens here.
    ///
    /// # Errors
    ///
    /// Fails if `data` has no rows, if `target` is not one of its columns, if
    /// the id is not a binary string of length `depth + 1`, or if
    /// `min_samples_split` is zero.
    pub fn new(
        data: Dataset<T>,
        target: &str,
        context: NodeContext<T>,
        params: &SplitterParams,
        observer: &mut dyn SplitObserver<T>,
    ) -> Result<Self, SplitterError> {
        if !data.is_not_empty() {
            return Err(SplitterError::EmptyDataset);
        }
        let target_index = data
            .column_index(target)
            .ok_or_else(|| SplitterError::MissingColumn(target.to_string()))?;
        if !is_valid_id(&context.id, context.depth) {
            return Err(SplitterError::InvalidNodeId {
                id: context.id,
                depth: context.depth,
            });
        }
        if params.min_samples_split() < 1 {
            return Err(SplitterError::InvalidParameter(
                "The minimum number of samples per split must be at least 1.".into(),
            ));
        }

        Ok(Self::build(
            data,
            target.to_string(),
            target_index,
            context,
            params.clone(),
            observer,
        ))
    }

    fn build(
        data: Dataset<T>,
        target: String,
        target_index: usize,
        context: NodeContext<T>,
        params: SplitterParams,
        observer: &mut dyn SplitObserver<T>,
    ) -> Self {
        let node = Self {
            id: context.id,
            depth: context.depth,
            target,
            target_index,
            params,
            mean: data.mean(target_index),
            n_samples: data.nrows(),
            data,
            blocked_features: context.blocked_features,
            parent_rule: context.parent_rule,
            outcome: SplitOutcome::Pending,
        };

        observer.on_event(&SplitEvent::NodeCreated {
            id: node.id.clone(),
            depth: node.depth,
            n_samples: node.n_samples,
            mean: node.mean,
            parent_rule: node.parent_rule.as_ref().map(ToString::to_string),
            blocked_features: node.blocked_features.clone(),
        });
        node
    }

    /// Grows the subtree rooted at this node.
    ///
    /// Children are built and then split depth first, the left subtree
    /// completely before the right one. A node that is no longer pending is
    /// left untouched.
    pub fn split(&mut self, observer: &mut dyn SplitObserver<T>) {
        if !matches!(self.outcome, SplitOutcome::Pending) {
            return;
        }

        if self.depth >= self.params.max_depth() {
            self.outcome = SplitOutcome::Leaf(LeafReason::MaxDepth);
            observer.on_event(&SplitEvent::MaxDepthReached {
                id: self.id.clone(),
                depth: self.depth,
                max_depth: self.params.max_depth(),
            });
            return;
        }

        let eligible = self.eligible_feature_indices();
        let best = find_best_split(
            &self.data,
            self.target_index,
            &eligible,
            self.params.min_samples_split(),
            self.params.selection_policy(),
        );

        let Some(best) = best else {
            self.outcome = SplitOutcome::Leaf(LeafReason::NoSplitFound);
            observer.on_event(&SplitEvent::NoSplitFound {
                id: self.id.clone(),
                depth: self.depth,
                min_samples_split: self.params.min_samples_split(),
                eligible_features: eligible
                    .iter()
                    .map(|&index| self.data.columns()[index].clone())
                    .collect(),
            });
            return;
        };

        let feature = self.data.columns()[best.chosen.feature_index].clone();
        let threshold = best.chosen.threshold;
        let left_id = format!("{}0", self.id);
        let right_id = format!("{}1", self.id);

        observer.on_event(&SplitEvent::BestSplitFound {
            id: self.id.clone(),
            depth: self.depth,
            feature: feature.clone(),
            threshold,
            gain: best.best_gain,
            left_child_id: left_id.clone(),
            right_child_id: right_id.clone(),
        });

        let (left_data, right_data) = self
            .data
            .split_on_threshold(best.chosen.feature_index, threshold);

        let mut blocked_features = self.blocked_features.clone();
        blocked_features.insert(feature.clone());

        let mut left = self.child(
            left_data,
            NodeContext {
                id: left_id.clone(),
                depth: self.depth + 1,
                blocked_features: blocked_features.clone(),
                parent_rule: Some(ParentRule {
                    feature: feature.clone(),
                    threshold,
                    side: Side::Left,
                    child_id: left_id,
                }),
            },
            observer,
        );
        let mut right = self.child(
            right_data,
            NodeContext {
                id: right_id.clone(),
                depth: self.depth + 1,
                blocked_features,
                parent_rule: Some(ParentRule {
                    feature: feature.clone(),
                    threshold,
                    side: Side::Right,
                    child_id: right_id,
                }),
            },
            observer,
        );

        left.split(observer);
        right.split(observer);

        self.outcome = SplitOutcome::Internal {
            feature,
            threshold,
            gain: best.best_gain,
            left: Box::new(left),
            right: Box::new(right),
        };
    }

    fn child(
        &self,
        data: Dataset<T>,
        context: NodeContext<T>,
        observer: &mut dyn SplitObserver<T>,
    ) -> Self {
        Self::build(
            data,
            self.target.clone(),
            self.target_index,
            context,
            self.params.clone(),
            observer,
        )
    }

    /// Column indices that may still be split on, in column order.
    fn eligible_feature_indices(&self) -> Vec<usize> {
        self.data
            .columns()
            .iter()
            .enumerate()
            .filter(|(index, name)| {
                *index != self.target_index && !self.blocked_features.contains(name.as_str())
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Names of the features that may still be split on, in column order.
    pub fn eligible_features(&self) -> Vec<&str> {
        self.eligible_feature_indices()
            .into_iter()
            .map(|index| self.data.columns()[index].as_str())
            .collect()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn depth(&self) -> u16 {
        self.depth
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn params(&self) -> &SplitterParams {
        &self.params
    }

    /// Rows routed to this node.
    pub fn data(&self) -> &Dataset<T> {
        &self.data
    }

    pub fn blocked_features(&self) -> &BTreeSet<String> {
        &self.blocked_features
    }

    pub fn parent_rule(&self) -> Option<&ParentRule<T>> {
        self.parent_rule.as_ref()
    }

    pub fn mean(&self) -> T {
        self.mean
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn outcome(&self) -> &SplitOutcome<T> {
        &self.outcome
    }

    /// True once `split` has run and decided not to split this node.
    pub fn is_leaf(&self) -> bool {
        matches!(self.outcome, SplitOutcome::Leaf(_))
    }

    pub fn split_feature(&self) -> Option<&str> {
        match &self.outcome {
            SplitOutcome::Internal { feature, .. } => Some(feature.as_str()),
            _ => None,
        }
    }

    pub fn split_threshold(&self) -> Option<T> {
        match &self.outcome {
            SplitOutcome::Internal { threshold, .. } => Some(*threshold),
            _ => None,
        }
    }

    pub fn left(&self) -> Option<&SplitterNode<T>> {
        match &self.outcome {
            SplitOutcome::Internal { left, .. } => Some(&**left),
            _ => None,
        }
    }

    pub fn right(&self) -> Option<&SplitterNode<T>> {
        match &self.outcome {
            SplitOutcome::Internal { right, .. } => Some(&**right),
            _ => None,
        }
    }

    /// Every node of the subtree in pre-order: node, left subtree, right subtree.
    pub fn nodes(&self) -> Vec<&SplitterNode<T>> {
        let mut nodes = Vec::new();
        self.collect_nodes(&mut nodes);
        nodes
    }

    fn collect_nodes<'a>(&'a self, nodes: &mut Vec<&'a SplitterNode<T>>) {
        nodes.push(self);
        if let SplitOutcome::Internal { left, right, .. } = &self.outcome {
            left.collect_nodes(nodes);
            right.collect_nodes(nodes);
        }
    }

    /// Nodes without children, left to right.
    pub fn leaves(&self) -> Vec<&SplitterNode<T>> {
        self.nodes()
            .into_iter()
            .filter(|node| !matches!(node.outcome, SplitOutcome::Internal { .. }))
            .collect()
    }
}

fn is_valid_id(id: &str, depth: u16) -> bool {
    id.len() == usize::from(depth) + 1 && id.bytes().all(|b| b == b'0' || b == b'1')
}

impl<T: RealNumber> Display for SplitterNode<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for node in self.nodes() {
            let indent = "  ".repeat(usize::from(node.depth - self.depth));
            write!(
                f,
                "{indent}[{}] n={} mean={:.4}",
                node.id,
                node.n_samples,
                node.mean.to_f64().unwrap_or(f64::NAN)
            )?;
            if let Some(rule) = &node.parent_rule {
                write!(f, " ({rule})")?;
            }
            match &node.outcome {
                SplitOutcome::Pending => writeln!(f)?,
                SplitOutcome::Leaf(LeafReason::MaxDepth) => writeln!(f, " leaf: max depth")?,
                SplitOutcome::Leaf(LeafReason::NoSplitFound) => writeln!(f, " leaf: no split")?,
                SplitOutcome::Internal {
                    feature,
                    threshold,
                    gain,
                    ..
                } => writeln!(
                    f,
                    " split {feature} <= {threshold} (gain {:.3})",
                    gain.to_f64().unwrap_or(f64::NAN)
                )?,
            }
        }
        Ok(())
    }
}
