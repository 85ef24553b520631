//
// reward.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 08 2021
//

/// Reward computed from a view of CPU RAM
pub type RewardFn = Box<dyn FnMut(&[u8]) -> i32>;
/// Builds a fresh stateful reward function for every episode
pub type RewardFactory = Box<dyn Fn() -> RewardFn>;

/// Where `act` takes its reward from
pub enum RewardSource {
    /// The game settings' reward, summed over skipped frames
    Builtin,
    /// Evaluated once after each act
    Function(RewardFn),
    /// Like `Function`, but the function is rebuilt on every episode reset
    Factory {
        factory: RewardFactory,
        current: RewardFn,
    },
}

impl Default for RewardSource {
    fn default() -> Self {
        RewardSource::Builtin
    }
}

impl RewardSource {
    pub fn function<F>(f: F) -> Self
    where
        F: FnMut(&[u8]) -> i32 + 'static,
    {
        RewardSource::Function(Box::new(f))
    }

    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> RewardFn + 'static,
    {
        let current = factory();
        RewardSource::Factory {
            factory: Box::new(factory),
            current,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, RewardSource::Builtin)
    }

    /// Start of a new episode
    pub fn reset(&mut self) {
        if let RewardSource::Factory { factory, current } = self {
            *current = factory();
        }
    }

    /// Evaluate a RAM based reward. `None` for the builtin source
    pub fn evaluate(&mut self, ram: &[u8]) -> Option<i32> {
        match self {
            RewardSource::Builtin => None,
            RewardSource::Function(f) => Some(f(ram)),
            RewardSource::Factory { current, .. } => Some(current(ram)),
        }
    }
}
