//! Bounded FIFO buffer holding the most recent samples.

use std::collections::VecDeque;

use super::sample::{AccelSample, AxisSeries};

pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<AccelSample>,
    capacity: usize,
}

impl SampleBuffer {
    /// A capacity of zero is bumped to one so the latest sample is always kept.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Appends a sample, returning how many old samples were evicted.
    pub fn push(&mut self, sample: AccelSample) -> usize {
        self.samples.push_back(sample);
        let mut evicted = 0;
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Replaces the whole content, keeping only the newest `capacity` samples.
    pub fn replace(&mut self, samples: impl IntoIterator<Item = AccelSample>) {
        self.samples.clear();
        for sample in samples {
            self.push(sample);
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn latest(&self) -> Option<&AccelSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccelSample> {
        self.samples.iter()
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.magnitude).collect()
    }

    pub fn axes(&self) -> AxisSeries {
        AxisSeries::from_samples(self.samples.iter())
    }

    pub fn snapshot(&self) -> Vec<AccelSample> {
        self.samples.iter().cloned().collect()
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}
