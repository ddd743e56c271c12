//! Assembly of JoinSplit descriptions.
//!
//! A [`JoinSplitBuilder`] collects up to two real inputs and two real
//! outputs. Empty slots are filled with zero-valued decoys when the
//! JoinSplit is built, so every description spends two notes and creates two
//! notes, and observers can't tell real notes from decoys.

use rand_core::{CryptoRng, RngCore};
use thiserror::Error;

use crate::{
    amount::{self, Amount, NonNegative},
    error::RandError,
    joinsplit::{self, Index, JoinSplit, RandomSeed},
    keys::{PaymentAddress, SpendingKey},
    note::{Mac, Memo, Note, NotePlaintext, NullifierSeed, Phi},
    note_encryption::NoteEncryptor,
    primitives::{
        ed25519,
        proofs::{InputWitness, PrimaryInputs, PrivateWitness, ProvingError},
        ProofSystem,
    },
    tree::{NoteCommitmentTree, NoteCommitmentTreeError, Root, Witness, MERKLE_DEPTH},
};

#[cfg(test)]
mod tests;

/// An error returned when a JoinSplit can't be built.
///
/// Every variant except [`BuildError::Rand`] is a caller error.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// A JoinSplit spends at most two notes.
    #[error("a JoinSplit has at most two inputs")]
    TooManyInputs,

    /// A JoinSplit creates at most two notes.
    #[error("a JoinSplit has at most two outputs")]
    TooManyOutputs,

    /// The input note is owned by another key.
    #[error("input note is not owned by its spending key")]
    WrongSpendingKey,

    /// The input witness is for another note.
    #[error("input witness does not authenticate its note")]
    InvalidWitness,

    /// All inputs of a JoinSplit are spent against one anchor.
    #[error("inputs are witnessed against different anchors: {first:?} and {second:?}")]
    AnchorMismatch {
        /// The anchor of the first real input.
        first: Root,
        /// The conflicting anchor.
        second: Root,
    },

    /// The value entering the JoinSplit is not equal to the value leaving it.
    #[error("JoinSplit values are not balanced: {inputs} zatoshis in, {outputs} zatoshis out")]
    ValueImbalance {
        /// The value of the inputs, plus `vpub_old`.
        inputs: i128,
        /// The value of the outputs, plus `vpub_new`.
        outputs: i128,
    },

    /// A change amount is outside the valid range.
    #[error("invalid change amount: {0}")]
    Amount(#[from] amount::Error),

    /// The random number generator failed.
    #[error(transparent)]
    Rand(#[from] RandError),

    /// A decoy note could not be witnessed.
    #[error(transparent)]
    Tree(#[from] NoteCommitmentTreeError),

    /// The proving system rejected the witness.
    #[error(transparent)]
    Proving(#[from] ProvingError),
}

/// A note the sender owns and spends in a JoinSplit.
#[derive(Clone, Debug)]
struct Spend {
    spending_key: SpendingKey,
    note: Note,
    witness: Witness,
}

/// A note the sender creates in a JoinSplit.
#[derive(Clone, Debug)]
struct Output {
    address: PaymentAddress,
    value: Amount<NonNegative>,
    memo: Memo,
}

/// The content of an input or output slot.
#[derive(Clone, Debug)]
enum Slot<T> {
    Real(T),
    Decoy,
}

impl<T> Slot<T> {
    fn is_real(&self) -> bool {
        matches!(self, Slot::Real(_))
    }
}

/// Collects the inputs and outputs of one JoinSplit.
#[derive(Clone, Debug)]
pub struct JoinSplitBuilder {
    inputs: Vec<Spend>,
    outputs: Vec<Output>,
    change_address: Option<PaymentAddress>,
    anchor: Option<Root>,
    vpub_old: Amount<NonNegative>,
    vpub_new: Amount<NonNegative>,
}

impl Default for JoinSplitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JoinSplitBuilder {
    /// Creates a builder with no inputs, no outputs and no public value.
    pub fn new() -> Self {
        Self {
            inputs: Vec::with_capacity(2),
            outputs: Vec::with_capacity(2),
            change_address: None,
            anchor: None,
            vpub_old: Amount::zero(),
            vpub_new: Amount::zero(),
        }
    }

    /// Spends `note`, which is owned by `spending_key`.
    ///
    /// `witness` is the authentication path of the note against the
    /// anchor this JoinSplit is spent against.
    pub fn add_input(
        &mut self,
        spending_key: SpendingKey,
        note: Note,
        witness: Witness,
    ) -> Result<&mut Self, BuildError> {
        if self.inputs.len() >= 2 {
            return Err(BuildError::TooManyInputs);
        }
        if note.paying_key != spending_key.paying_key() {
            return Err(BuildError::WrongSpendingKey);
        }
        if !witness.authenticates(note.commitment()) {
            return Err(BuildError::InvalidWitness);
        }

        self.inputs.push(Spend {
            spending_key,
            note,
            witness,
        });

        Ok(self)
    }

    /// Sends `value` to `address`, with `memo`.
    pub fn add_output(
        &mut self,
        address: PaymentAddress,
        value: Amount<NonNegative>,
        memo: Memo,
    ) -> Result<&mut Self, BuildError> {
        if self.outputs.len() >= 2 {
            return Err(BuildError::TooManyOutputs);
        }

        self.outputs.push(Output {
            address,
            value,
            memo,
        });

        Ok(self)
    }

    /// Sends any surplus input value to `address`.
    ///
    /// Change needs a free output slot. Without a change address, inputs
    /// and outputs must balance exactly.
    pub fn change_address(&mut self, address: PaymentAddress) -> &mut Self {
        self.change_address = Some(address);
        self
    }

    /// The anchor to publish when there are no real inputs.
    ///
    /// Defaults to the root of the empty tree.
    pub fn anchor(&mut self, anchor: Root) -> &mut Self {
        self.anchor = Some(anchor);
        self
    }

    /// Value moved from the transparent pool into the JoinSplit.
    pub fn vpub_old(&mut self, value: Amount<NonNegative>) -> &mut Self {
        self.vpub_old = value;
        self
    }

    /// Value moved from the JoinSplit into the transparent pool.
    pub fn vpub_new(&mut self, value: Amount<NonNegative>) -> &mut Self {
        self.vpub_new = value;
        self
    }

    /// Returns the anchor that all real inputs are witnessed against.
    fn common_anchor(&self) -> Result<Root, BuildError> {
        let mut anchors = self.inputs.iter().map(|spend| spend.witness.anchor());

        let Some(first) = anchors.next() else {
            return Ok(self
                .anchor
                .unwrap_or_else(|| NoteCommitmentTree::<MERKLE_DEPTH>::new(false).root()));
        };

        for second in anchors.chain(self.anchor) {
            if second != first {
                return Err(BuildError::AnchorMismatch { first, second });
            }
        }

        Ok(first)
    }

    /// Pays any surplus to the change address, then checks that values
    /// balance.
    fn balance(&mut self) -> Result<(), BuildError> {
        let inputs: i128 = self
            .inputs
            .iter()
            .map(|spend| i128::from(spend.note.value.zatoshis()))
            .sum::<i128>()
            + i128::from(self.vpub_old.zatoshis());
        let outputs: i128 = self
            .outputs
            .iter()
            .map(|output| i128::from(output.value.zatoshis()))
            .sum::<i128>()
            + i128::from(self.vpub_new.zatoshis());

        if inputs > outputs && self.outputs.len() < 2 {
            if let Some(address) = self.change_address {
                let change = i64::try_from(inputs - outputs).map_err(|_| {
                    BuildError::ValueImbalance { inputs, outputs }
                })?;
                let value = Amount::try_from(change)?;

                tracing::trace!(?value, "adding change output");
                self.outputs.push(Output {
                    address,
                    value,
                    memo: Memo::empty(),
                });

                return Ok(());
            }
        }

        if inputs != outputs {
            return Err(BuildError::ValueImbalance { inputs, outputs });
        }

        Ok(())
    }

    /// Builds the JoinSplit for the transaction with binding verification
    /// key `joinsplit_pub_key`.
    ///
    /// Decoy keys, notes and trapdoors are drawn from `csprng`, like every
    /// other secret of the JoinSplit.
    pub fn build<T, S>(
        mut self,
        csprng: &mut T,
        joinsplit_pub_key: &ed25519::VerificationKeyBytes,
        proof_system: &S,
    ) -> Result<JoinSplit<S::Proof>, BuildError>
    where
        T: RngCore + CryptoRng,
        S: ProofSystem + ?Sized,
    {
        let span = tracing::debug_span!(
            "build_joinsplit",
            real_inputs = self.inputs.len(),
            real_outputs = self.outputs.len(),
        );
        let _entered = span.enter();

        let anchor = self.common_anchor()?;
        self.balance()?;

        let mut input_slots: Vec<Slot<Spend>> = self.inputs.drain(..).map(Slot::Real).collect();
        input_slots.resize_with(2, || Slot::Decoy);
        let mut output_slots: Vec<Slot<Output>> = self.outputs.drain(..).map(Slot::Real).collect();
        output_slots.resize_with(2, || Slot::Decoy);

        tracing::trace!(
            decoy_inputs = input_slots.iter().filter(|slot| !slot.is_real()).count(),
            decoy_outputs = output_slots.iter().filter(|slot| !slot.is_real()).count(),
            "filled empty slots with decoys"
        );

        let [first_input, second_input]: [Slot<Spend>; 2] = input_slots
            .try_into()
            .map_err(|_| BuildError::TooManyInputs)?;
        let inputs = [
            resolve_input(csprng, first_input)?,
            resolve_input(csprng, second_input)?,
        ];

        let random_seed = RandomSeed::new(csprng)?;
        let nullifiers = [
            inputs[0].note.nullifier(&inputs[0].spending_key),
            inputs[1].note.nullifier(&inputs[1].spending_key),
        ];
        let h_sig = joinsplit::h_sig(
            &random_seed,
            &nullifiers[0],
            &nullifiers[1],
            joinsplit_pub_key,
        );
        let vmacs = [
            Mac::new(&inputs[0].spending_key, Index::First, &h_sig),
            Mac::new(&inputs[1].spending_key, Index::Second, &h_sig),
        ];

        let phi = Phi::new(csprng)?;
        let [first_output, second_output]: [Slot<Output>; 2] = output_slots
            .try_into()
            .map_err(|_| BuildError::TooManyOutputs)?;
        let first_output = resolve_output(csprng, first_output)?;
        let second_output = resolve_output(csprng, second_output)?;

        let output_notes = [
            Note::new(
                csprng,
                first_output.address.paying_key,
                first_output.value,
                phi.rho(Index::First, &h_sig),
            )?,
            Note::new(
                csprng,
                second_output.address.paying_key,
                second_output.value,
                phi.rho(Index::Second, &h_sig),
            )?,
        ];
        let commitments = [output_notes[0].commitment(), output_notes[1].commitment()];

        let primary_inputs = PrimaryInputs {
            anchor,
            h_sig,
            nullifiers,
            vmacs,
            commitments,
            vpub_old: self.vpub_old,
            vpub_new: self.vpub_new,
        };
        let private_witness = PrivateWitness {
            inputs,
            outputs: output_notes,
            phi,
        };

        let zkproof = proof_system.prove(&private_witness, &primary_inputs)?;

        let encryptor = NoteEncryptor::new(csprng, h_sig)?;
        let enc_ciphertexts = [
            encryptor.encrypt(
                Index::First,
                &NotePlaintext::new(&output_notes[0], first_output.memo),
                &first_output.address.transmission_key,
            ),
            encryptor.encrypt(
                Index::Second,
                &NotePlaintext::new(&output_notes[1], second_output.memo),
                &second_output.address.transmission_key,
            ),
        ];

        tracing::debug!(?anchor, "built JoinSplit");

        Ok(JoinSplit {
            vpub_old: self.vpub_old,
            vpub_new: self.vpub_new,
            anchor,
            nullifiers,
            commitments,
            ephemeral_key: encryptor.epk(),
            random_seed,
            vmacs,
            zkproof,
            enc_ciphertexts,
        })
    }
}

/// Returns the witness of a real input, or of a fresh zero-valued decoy.
///
/// Decoys are owned by a throwaway key, and witnessed in a throwaway tree.
/// Their value is zero, so the proof does not check their anchor.
fn resolve_input<T>(csprng: &mut T, slot: Slot<Spend>) -> Result<InputWitness, BuildError>
where
    T: RngCore + CryptoRng,
{
    match slot {
        Slot::Real(Spend {
            spending_key,
            note,
            witness,
        }) => Ok(InputWitness {
            spending_key,
            note,
            witness,
        }),
        Slot::Decoy => {
            let spending_key = SpendingKey::new(csprng)?;
            let rho = NullifierSeed::new(csprng)?;
            let note = Note::new(csprng, spending_key.paying_key(), Amount::zero(), rho)?;

            let mut tree = NoteCommitmentTree::<MERKLE_DEPTH>::new(false);
            let (_, witness) = tree.append(note.commitment())?;

            Ok(InputWitness {
                spending_key,
                note,
                witness,
            })
        }
    }
}

/// Returns a real output, or a zero-valued decoy to a throwaway address.
fn resolve_output<T>(csprng: &mut T, slot: Slot<Output>) -> Result<Output, BuildError>
where
    T: RngCore + CryptoRng,
{
    match slot {
        Slot::Real(output) => Ok(output),
        Slot::Decoy => Ok(Output {
            address: SpendingKey::new(csprng)?.address(),
            value: Amount::zero(),
            memo: Memo::empty(),
        }),
    }
}
