use proptest::{collection::vec, prelude::*};

use super::{EncryptedNote, Memo};

impl Arbitrary for EncryptedNote {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (vec(any::<u8>(), 601))
            .prop_map(|v| {
                let mut bytes = [0; 601];
                bytes.copy_from_slice(v.as_slice());
                Self(bytes)
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for Memo {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (vec(any::<u8>(), 0..=512))
            .prop_map(|v| Memo::try_from(v.as_slice()).expect("memo fits in 512 bytes"))
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
