use crate::scoring::validate_residues;
use crate::Result;

/// Owned residue buffer with an optional identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    id: String,
    data: Vec<u8>,
}

impl Sequence {
    pub fn new(data: &[u8]) -> Self {
        Self {
            id: String::new(),
            data: data.to_vec(),
        }
    }

    pub fn with_id(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self { id: id.into(), data }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn residues(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks that every residue is one of the 20 standard amino acids.
    pub fn validate(&self) -> Result<()> {
        validate_residues(&self.data)
    }
}

impl AsRef<[u8]> for Sequence {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
