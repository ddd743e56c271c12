use std::{cmp, fmt};

/// A 512-byte memo, delivered to the recipient inside the note plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct Memo(pub(crate) Box<[u8; 512]>);

impl Memo {
    /// The "no memo" value: `0xF6` followed by 511 zero bytes.
    pub fn empty() -> Self {
        let mut bytes = [0u8; 512];
        bytes[0] = 0xF6;

        Self(Box::new(bytes))
    }

    /// Returns `true` if this is the "no memo" value.
    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

impl Default for Memo {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<&[u8]> for Memo {
    type Error = &'static str;

    /// Pads `input` with zeros to 512 bytes.
    fn try_from(input: &[u8]) -> Result<Self, Self::Error> {
        let mut full_bytes = [0; 512];

        match input.len().cmp(&512) {
            cmp::Ordering::Less => {
                full_bytes[0..input.len()].copy_from_slice(input);
                Ok(Memo(Box::new(full_bytes)))
            }
            cmp::Ordering::Equal => {
                full_bytes[..].copy_from_slice(input);
                Ok(Memo(Box::new(full_bytes)))
            }
            cmp::Ordering::Greater => Err("Memos have a max length of 512 bytes."),
        }
    }
}

impl From<[u8; 512]> for Memo {
    fn from(bytes: [u8; 512]) -> Self {
        Memo(Box::new(bytes))
    }
}

impl AsRef<[u8]> for Memo {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl fmt::Debug for Memo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Memo(empty)");
        }

        let end = self.0.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);

        match std::str::from_utf8(&self.0[..end]) {
            Ok(memo) => f.debug_tuple("Memo").field(&memo).finish(),
            Err(_) => f
                .debug_tuple("Memo")
                .field(&hex::encode(&self.0[..end]))
                .finish(),
        }
    }
}
