//! Token accounting across the completion requests of a run
//!
//! Each [`ModelResponse`](crate::items::ModelResponse) may carry a [`Usage`]
//! reported by the provider; the runner sums them into the
//! [`RunResult`](crate::RunResult).

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Token usage for one or more completion requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: usize,

    /// Tokens in the generated completion.
    pub completion_tokens: usize,

    /// Prompt plus completion.
    pub total_tokens: usize,

    /// Number of requests this usage covers.
    pub request_count: usize,
}

impl Usage {
    /// Usage of a single request.
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            request_count: 1,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.request_count == 0 && self.total_tokens == 0
    }
}

impl Add for Usage {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
        self.request_count += other.request_count;
    }
}
