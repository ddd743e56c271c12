//! Randomised test data generation for amounts.

use std::marker::PhantomData;

use proptest::prelude::*;

use super::{Amount, Constraint};

impl<C> Arbitrary for Amount<C>
where
    C: Constraint + std::fmt::Debug + 'static,
{
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        C::valid_range()
            .prop_map(|value| Self(value, PhantomData))
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
