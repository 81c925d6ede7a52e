level_score! {
    /// A score with separate hard and soft levels.
    ///
    /// Hard scores are compared first; soft scores only break ties.
    ///
    /// # Examples
    ///
    /// ```
    /// use scorenet_core::{HardSoftScore, Score};
    ///
    /// let broken = HardSoftScore::of(-1, 0);
    /// let costly = HardSoftScore::of(0, -200);
    /// assert!(costly > broken);
    /// assert!(!broken.is_feasible());
    /// assert_eq!(costly.to_string(), "0hard/-200soft");
    /// ```
    pub struct HardSoftScore {
        hard: Hard => "hard",
        soft: Soft => "soft",
    }
}

impl HardSoftScore {
    pub const ONE_HARD: HardSoftScore = HardSoftScore::of(1, 0);

    pub const ONE_SOFT: HardSoftScore = HardSoftScore::of(0, 1);

    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        HardSoftScore::of(hard, 0)
    }

    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        HardSoftScore::of(0, soft)
    }
}
