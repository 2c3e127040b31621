//! Partition plans: how input units map onto tasks.
//!
//! Two schemes are supported:
//! - **Contiguous** chunking for in-memory collections and integer ranges.
//!   `chunk_size = max(1, N / P)`; chunks start at `0, chunk_size, ...` and
//!   the last one may be shorter. This can yield more chunks than `P`
//!   (N=10, P=3 gives `[3, 3, 3, 1]`), and fewer when `N < P`.
//! - **Round-robin** bucketing for file fragments. Fragment `i` goes to bucket
//!   `i mod P`; empty buckets are dropped. Buckets balance fragment count,
//!   not byte size.
//!
//! Plans are pure functions of their inputs.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use common_error::{TesseraError, TesseraResult, ensure};

// ============================================================================
// Partitioning Scheme
// ============================================================================

/// High-level partitioning scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitioningScheme {
    /// Consecutive spans of `chunk_size` units.
    Contiguous {
        /// Units per chunk (the last chunk may hold fewer).
        chunk_size: usize,
    },
    /// Unit `i` assigned to task `i mod parallelism`.
    RoundRobin,
}

// ============================================================================
// Partition
// ============================================================================

/// The units of one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionUnits {
    /// A half-open span `[start, start + count)`.
    Range {
        /// First unit.
        start: usize,
        /// Number of units.
        count: usize,
    },
    /// Explicit unit indices, in submission order.
    Indices(Vec<usize>),
}

impl PartitionUnits {
    /// Number of units.
    pub fn len(&self) -> usize {
        match self {
            Self::Range { count, .. } => *count,
            Self::Indices(indices) => indices.len(),
        }
    }

    /// Whether there are no units.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the unit indices in order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        match self {
            Self::Range { start, count } => Box::new(*start..*start + *count),
            Self::Indices(indices) => Box::new(indices.iter().copied()),
        }
    }
}

/// One non-empty partition: a task index and its units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Task index this partition runs as.
    pub task_index: usize,
    /// Units assigned to the task.
    pub units: PartitionUnits,
}

// ============================================================================
// PartitionPlan
// ============================================================================

/// A deterministic mapping from input units to tasks.
///
/// Only non-empty partitions are kept, in task order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionPlan {
    scheme: PartitioningScheme,
    parallelism: usize,
    num_units: usize,
    partitions: Vec<Partition>,
}

impl PartitionPlan {
    /// Contiguous chunking of `num_units` units for a target parallelism.
    ///
    /// `num_units == 0` yields an empty plan.
    pub fn contiguous(num_units: usize, parallelism: usize) -> TesseraResult<Self> {
        check_parallelism(parallelism)?;

        let chunk_size = (num_units / parallelism).max(1);
        let partitions = (0..num_units)
            .step_by(chunk_size)
            .enumerate()
            .map(|(task_index, start)| Partition {
                task_index,
                units: PartitionUnits::Range {
                    start,
                    count: chunk_size.min(num_units - start),
                },
            })
            .collect();

        let plan = Self {
            scheme: PartitioningScheme::Contiguous { chunk_size },
            parallelism,
            num_units,
            partitions,
        };
        debug!("Planned {plan} for {num_units} units");
        Ok(plan)
    }

    /// Round-robin bucketing of `num_units` units for a target parallelism.
    ///
    /// Fails with `ConfigurationError` when there are no units.
    pub fn round_robin(num_units: usize, parallelism: usize) -> TesseraResult<Self> {
        check_parallelism(parallelism)?;
        if num_units == 0 {
            return Err(TesseraError::configuration(
                "no data: input resolved to zero fragments",
            ));
        }

        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); parallelism.min(num_units)];
        for unit in 0..num_units {
            buckets[unit % parallelism].push(unit);
        }

        let partitions = buckets
            .into_iter()
            .enumerate()
            .filter(|(_, units)| !units.is_empty())
            .map(|(task_index, units)| Partition {
                task_index,
                units: PartitionUnits::Indices(units),
            })
            .collect();

        let plan = Self {
            scheme: PartitioningScheme::RoundRobin,
            parallelism,
            num_units,
            partitions,
        };
        debug!("Planned {plan} for {num_units} units");
        Ok(plan)
    }

    /// The partitioning scheme.
    pub fn scheme(&self) -> PartitioningScheme {
        self.scheme
    }

    /// The requested parallelism.
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Total number of input units.
    pub fn num_units(&self) -> usize {
        self.num_units
    }

    /// The non-empty partitions, in task order.
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Number of non-empty partitions (and so of blocks produced).
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Unit count of each partition, in order.
    pub fn sizes(&self) -> Vec<usize> {
        self.partitions.iter().map(|p| p.units.len()).collect()
    }

    /// The task index `unit` is assigned to, or `None` if out of range.
    pub fn task_for_unit(&self, unit: usize) -> Option<usize> {
        if unit >= self.num_units {
            return None;
        }
        match self.scheme {
            PartitioningScheme::Contiguous { chunk_size } => Some(unit / chunk_size),
            PartitioningScheme::RoundRobin => Some(unit % self.parallelism),
        }
    }
}

impl fmt::Display for PartitionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme {
            PartitioningScheme::Contiguous { chunk_size } => write!(
                f,
                "Contiguous(chunk_size={chunk_size}, partitions={})",
                self.partitions.len()
            ),
            PartitioningScheme::RoundRobin => write!(
                f,
                "RoundRobin(parallelism={}, partitions={})",
                self.parallelism,
                self.partitions.len()
            ),
        }
    }
}

fn check_parallelism(parallelism: usize) -> TesseraResult<()> {
    ensure!(parallelism > 0, ConfigurationError: "parallelism must be a positive integer, got 0");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
