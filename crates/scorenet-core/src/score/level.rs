/// What a score level stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreLevel {
    /// Broken hard levels make a score infeasible.
    Hard,
    Medium,
    Soft,
}
