//! Trusted setup for the read-non-zero membership circuit.

use std::path::Path;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::rngs::StdRng;
use thiserror::Error;
use tracing::info;

use accumulator_circuits::ReadNonZeroCircuit;

/// Errors that can occur during setup
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Circuit setup failed: {0}")]
    CircuitSetup(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("Deserialization failed: {0}")]
    Deserialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Keys for a single circuit
#[derive(Clone)]
pub struct CircuitKeyPair {
    pub proving_key: ProvingKey<Bn254>,
    pub verifying_key: VerifyingKey<Bn254>,
}

impl CircuitKeyPair {
    pub fn serialize_pk(&self) -> Result<Vec<u8>, SetupError> {
        let mut bytes = Vec::new();
        self.proving_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| SetupError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    pub fn serialize_vk(&self) -> Result<Vec<u8>, SetupError> {
        let mut bytes = Vec::new();
        self.verifying_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| SetupError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    pub fn deserialize_pk(bytes: &[u8]) -> Result<ProvingKey<Bn254>, SetupError> {
        ProvingKey::deserialize_compressed(bytes)
            .map_err(|e| SetupError::Deserialization(e.to_string()))
    }

    pub fn deserialize_vk(bytes: &[u8]) -> Result<VerifyingKey<Bn254>, SetupError> {
        VerifyingKey::deserialize_compressed(bytes)
            .map_err(|e| SetupError::Deserialization(e.to_string()))
    }

    /// Write `{name}.pk` and `{name}.vk` into `dir`.
    pub fn save(&self, dir: &Path, name: &str) -> Result<(), SetupError> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(format!("{name}.pk")), self.serialize_pk()?)?;
        std::fs::write(dir.join(format!("{name}.vk")), self.serialize_vk()?)?;
        Ok(())
    }

    pub fn load(dir: &Path, name: &str) -> Result<Self, SetupError> {
        Ok(Self {
            proving_key: Self::deserialize_pk(&std::fs::read(dir.join(format!("{name}.pk")))?)?,
            verifying_key: Self::deserialize_vk(&std::fs::read(dir.join(format!("{name}.vk")))?)?,
        })
    }
}

/// Key file stem of the membership circuit for trees of `depth`.
pub fn read_non_zero_key_name(depth: usize) -> String {
    format!("read_non_zero_d{depth}")
}

/// Setup the membership circuit for trees of `depth`.
pub fn setup_read_non_zero(rng: &mut StdRng, depth: usize) -> Result<CircuitKeyPair, SetupError> {
    let circuit = ReadNonZeroCircuit::empty(depth);
    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, rng)
        .map_err(|e| SetupError::CircuitSetup(e.to_string()))?;

    info!(depth, "read-non-zero keys generated");
    Ok(CircuitKeyPair {
        proving_key: pk,
        verifying_key: vk,
    })
}

/// Load the membership keys from `dir`, or run setup and save them there.
pub fn load_or_setup_read_non_zero(
    dir: &Path,
    rng: &mut StdRng,
    depth: usize,
) -> Result<CircuitKeyPair, SetupError> {
    let name = read_non_zero_key_name(depth);
    if dir.join(format!("{name}.vk")).exists() {
        return CircuitKeyPair::load(dir, &name);
    }
    let keys = setup_read_non_zero(rng, depth)?;
    keys.save(dir, &name)?;
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::rand::SeedableRng;

    #[test]
    fn test_keys_round_trip_through_directory() {
        let mut rng = StdRng::seed_from_u64(42);
        let dir = tempfile::tempdir().unwrap();

        let keys = load_or_setup_read_non_zero(dir.path(), &mut rng, 4).unwrap();
        assert!(dir.path().join("read_non_zero_d4.pk").exists());

        let loaded = load_or_setup_read_non_zero(dir.path(), &mut rng, 4).unwrap();
        assert_eq!(loaded.serialize_vk().unwrap(), keys.serialize_vk().unwrap());
    }

    #[test]
    fn test_deserialize_garbage_fails() {
        assert!(matches!(
            CircuitKeyPair::deserialize_vk(&[1, 2, 3]),
            Err(SetupError::Deserialization(_))
        ));
    }
}
