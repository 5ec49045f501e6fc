//! Request pacing and client identity for page fetches.
//!
//! A [`PolitenessPolicy`] decides how long to wait before each request and
//! which `User-Agent` to present. Production runs use
//! [`RandomizedPoliteness`]; tests plug in [`FixedPoliteness`].

use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

/// Desktop browser identities rotated between requests.
pub const DESKTOP_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.7; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

pub trait PolitenessPolicy: Send + Sync {
    /// Pause before the next request.
    fn next_delay(&self) -> Duration;
    /// `User-Agent` header for the next request.
    fn user_agent(&self) -> String;
}

/// Uniformly random delay within `[min, max]` and a random agent per request.
#[derive(Debug, Clone)]
pub struct RandomizedPoliteness {
    min: Duration,
    max: Duration,
    agents: Vec<String>,
}

impl RandomizedPoliteness {
    /// Bounds are swapped if given in the wrong order. An empty agent pool
    /// falls back to [`DESKTOP_USER_AGENTS`].
    pub fn new(min: Duration, max: Duration, agents: Vec<String>) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let agents = if agents.is_empty() {
            DESKTOP_USER_AGENTS.iter().map(|s| s.to_string()).collect()
        } else {
            agents
        };
        Self { min, max, agents }
    }
}

impl Default for RandomizedPoliteness {
    /// One to three seconds between requests.
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(3), Vec::new())
    }
}

impl PolitenessPolicy for RandomizedPoliteness {
    fn next_delay(&self) -> Duration {
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        let ms = rand::thread_rng().gen_range(lo..=hi);
        Duration::from_millis(ms)
    }

    fn user_agent(&self) -> String {
        let mut rng = rand::thread_rng();
        self.agents
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| DESKTOP_USER_AGENTS[0].to_string())
    }
}

/// Same delay and agent every time.
#[derive(Debug, Clone)]
pub struct FixedPoliteness {
    pub delay: Duration,
    pub user_agent: String,
}

impl FixedPoliteness {
    /// No delay, first built-in agent.
    pub fn immediate() -> Self {
        Self {
            delay: Duration::ZERO,
            user_agent: DESKTOP_USER_AGENTS[0].to_string(),
        }
    }
}

impl PolitenessPolicy for FixedPoliteness {
    fn next_delay(&self) -> Duration {
        self.delay
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }
}
