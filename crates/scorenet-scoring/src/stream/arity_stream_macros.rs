//! Generates the operations every stream arity shares.
//!
//! Joins and `flatten_last` change the tuple shape differently per arity and
//! live in the individual stream files.

macro_rules! impl_arity_stream {
    ($stream:ident, $arity:expr, $($t:ident),+) => {
        pub struct $stream<$($t,)+ Sc: scorenet_core::Score> {
            pub(crate) def: std::sync::Arc<$crate::stream::definition::StreamDef>,
            _phantom: std::marker::PhantomData<fn() -> ($($t,)+ Sc)>,
        }

        impl<$($t,)+ Sc: scorenet_core::Score> Clone for $stream<$($t,)+ Sc> {
            fn clone(&self) -> Self {
                Self {
                    def: self.def.clone(),
                    _phantom: std::marker::PhantomData,
                }
            }
        }

        impl<$($t,)+ Sc> $stream<$($t,)+ Sc>
        where
            $($t: Send + Sync + 'static,)+
            Sc: scorenet_core::Score,
        {
            pub(crate) fn from_def(def: std::sync::Arc<$crate::stream::definition::StreamDef>) -> Self {
                Self {
                    def,
                    _phantom: std::marker::PhantomData,
                }
            }

            /// Keeps only the tuples matching a predicate.
            pub fn filter<P>(self, predicate: P) -> Self
            where
                P: Fn($(&$t),+) -> bool + Send + Sync + 'static,
            {
                use $crate::stream::definition::{StreamDef, StreamOp};

                let op = StreamOp::Filter($crate::stream::function::erase::<($($t,)+), bool, P>(predicate));
                Self::from_def(StreamDef::unary(&self.def, op, $arity))
            }

            /// Keeps the tuples for which at least one matching `Other` exists.
            pub fn if_exists<Other>(
                self,
                other: $crate::stream::UniConstraintStream<Other, Sc>,
                joiner: $crate::stream::joiner::Joiner<($($t,)+), Other>,
            ) -> Self
            where
                Other: Send + Sync + 'static,
            {
                self.existence($crate::stream::definition::ExistenceMode::Exists, &other.def, joiner.parts)
            }

            /// Keeps the tuples for which no matching `Other` exists.
            pub fn if_not_exists<Other>(
                self,
                other: $crate::stream::UniConstraintStream<Other, Sc>,
                joiner: $crate::stream::joiner::Joiner<($($t,)+), Other>,
            ) -> Self
            where
                Other: Send + Sync + 'static,
            {
                self.existence($crate::stream::definition::ExistenceMode::NotExists, &other.def, joiner.parts)
            }

            fn existence(
                self,
                mode: $crate::stream::definition::ExistenceMode,
                other: &std::sync::Arc<$crate::stream::definition::StreamDef>,
                parts: Vec<$crate::stream::joiner::JoinerPart>,
            ) -> Self {
                use $crate::stream::definition::{StreamDef, StreamOp};

                let op = StreamOp::Exists {
                    mode,
                    joiners: std::sync::Arc::new($crate::stream::joiner::JoinerSet::new(parts)),
                };
                Self::from_def(StreamDef::binary(&self.def, other, op, $arity))
            }

            /// Groups tuples by key and aggregates each group.
            ///
            /// Emits one `(key, result)` tuple per non-empty group.
            pub fn group_by<K, KF, Col>(
                self,
                key: KF,
                collector: Col,
            ) -> $crate::stream::BiConstraintStream<K, Col::Result, Sc>
            where
                K: Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
                KF: Fn($(&$t),+) -> K + Send + Sync + 'static,
                Col: $crate::stream::collector::Collector<($($t,)+)>,
            {
                use $crate::stream::definition::{StreamDef, StreamOp};

                let op = StreamOp::Group {
                    key: Some($crate::stream::function::erase_key::<($($t,)+), K, KF>(key)),
                    collector: Some($crate::stream::collector::erase_collector::<($($t,)+), Col>(collector)),
                };
                $crate::stream::BiConstraintStream::from_def(StreamDef::unary(&self.def, op, 2))
            }

            /// Emits each distinct key once.
            pub fn group_by_key<K, KF>(self, key: KF) -> $crate::stream::UniConstraintStream<K, Sc>
            where
                K: Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
                KF: Fn($(&$t),+) -> K + Send + Sync + 'static,
            {
                use $crate::stream::definition::{StreamDef, StreamOp};

                let op = StreamOp::Group {
                    key: Some($crate::stream::function::erase_key::<($($t,)+), K, KF>(key)),
                    collector: None,
                };
                $crate::stream::UniConstraintStream::from_def(StreamDef::unary(&self.def, op, 1))
            }

            /// Aggregates the whole stream into a single result.
            ///
            /// An empty stream emits nothing.
            pub fn group_by_collector<Col>(self, collector: Col) -> $crate::stream::UniConstraintStream<Col::Result, Sc>
            where
                Col: $crate::stream::collector::Collector<($($t,)+)>,
            {
                use $crate::stream::definition::{StreamDef, StreamOp};

                let op = StreamOp::Group {
                    key: None,
                    collector: Some($crate::stream::collector::erase_collector::<($($t,)+), Col>(collector)),
                };
                $crate::stream::UniConstraintStream::from_def(StreamDef::unary(&self.def, op, 1))
            }

            /// Maps every tuple to a single value.
            pub fn map<M, MF>(self, mapper: MF) -> $crate::stream::UniConstraintStream<M, Sc>
            where
                M: Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
                MF: Fn($(&$t),+) -> M + Send + Sync + 'static,
            {
                use $crate::stream::definition::{StreamDef, StreamOp};

                let op = StreamOp::Map($crate::stream::function::erase_key::<($($t,)+), M, MF>(mapper));
                $crate::stream::UniConstraintStream::from_def(StreamDef::unary(&self.def, op, 1))
            }

            /// Emits the tuples of both streams. A tuple present in both is
            /// emitted twice.
            pub fn concat(self, other: Self) -> Self {
                use $crate::stream::definition::{StreamDef, StreamOp};

                Self::from_def(StreamDef::binary(&self.def, &other.def, StreamOp::Concat, $arity))
            }

            /// Collapses equal tuples into one.
            pub fn distinct(self) -> Self {
                use $crate::stream::definition::{StreamDef, StreamOp};

                Self::from_def(StreamDef::unary(&self.def, StreamOp::Distinct, $arity))
            }

            /// Penalizes every match by `weight`.
            pub fn penalize(self, weight: Sc) -> $crate::stream::ConstraintBuilder<($($t,)+), Sc> {
                $crate::stream::ConstraintBuilder::new(self.def, scorenet_core::ImpactType::Penalty, weight, None)
            }

            /// Penalizes every match by `weight` times the match weight.
            pub fn penalize_with<W>(self, weight: Sc, match_weigher: W) -> $crate::stream::ConstraintBuilder<($($t,)+), Sc>
            where
                W: Fn($(&$t),+) -> i64 + Send + Sync + 'static,
            {
                $crate::stream::ConstraintBuilder::new(
                    self.def,
                    scorenet_core::ImpactType::Penalty,
                    weight,
                    Some($crate::stream::function::erase::<($($t,)+), i64, W>(match_weigher)),
                )
            }

            /// Rewards every match by `weight`.
            pub fn reward(self, weight: Sc) -> $crate::stream::ConstraintBuilder<($($t,)+), Sc> {
                $crate::stream::ConstraintBuilder::new(self.def, scorenet_core::ImpactType::Reward, weight, None)
            }

            /// Rewards every match by `weight` times the match weight.
            pub fn reward_with<W>(self, weight: Sc, match_weigher: W) -> $crate::stream::ConstraintBuilder<($($t,)+), Sc>
            where
                W: Fn($(&$t),+) -> i64 + Send + Sync + 'static,
            {
                $crate::stream::ConstraintBuilder::new(
                    self.def,
                    scorenet_core::ImpactType::Reward,
                    weight,
                    Some($crate::stream::function::erase::<($($t,)+), i64, W>(match_weigher)),
                )
            }
        }
    };
}
