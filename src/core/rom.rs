use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use crate::consts;

#[derive(Debug, thiserror::Error)]
pub enum RomError {
    #[error("failed to read rom image: {0}")]
    Io(#[from] std::io::Error),
    #[error("rom image is {size} bytes, program area holds {max} bytes")]
    TooLarge { size: usize, max: usize },
}

/// A program image destined for the load origin. Anything larger than the
/// program area is rejected up front rather than truncated.
#[derive(Debug, Default)]
pub struct Rom {
    bytes: Vec<u8>,
}

impl Rom {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let mut bytes = Vec::new();
        File::open(path)?.read_to_end(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, RomError> {
        if bytes.len() > consts::MAX_ROM_BYTES {
            return Err(RomError::TooLarge {
                size: bytes.len(),
                max: consts::MAX_ROM_BYTES,
            });
        }
        Ok(Rom { bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_ok() {
        let rom = Rom::from_bytes(vec![0x00, 0xE0]).unwrap();
        assert_eq!(rom.bytes(), &[0x00, 0xE0]);
    }

    #[test]
    fn test_max_size_accepted() {
        let rom = Rom::from_bytes(vec![0xAA; consts::MAX_ROM_BYTES]).unwrap();
        assert_eq!(rom.bytes().len(), consts::MAX_ROM_BYTES);
    }

    #[test]
    fn test_oversized_rejected() {
        let err = Rom::from_bytes(vec![0; consts::MAX_ROM_BYTES + 1]).unwrap_err();
        assert!(matches!(
            err,
            RomError::TooLarge { size, max } if size == consts::MAX_ROM_BYTES + 1 && max == consts::MAX_ROM_BYTES
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Rom::from_file("/no/such/rom.ch8").unwrap_err();
        assert!(matches!(err, RomError::Io(_)));
    }
}
