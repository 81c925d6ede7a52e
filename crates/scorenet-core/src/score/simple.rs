level_score! {
    /// A single soft level, printed as a bare number. Feasible when
    /// non-negative.
    pub struct SimpleScore {
        score: Soft => "",
    }
}

impl SimpleScore {
    pub const ONE: SimpleScore = SimpleScore::of(1);
}
