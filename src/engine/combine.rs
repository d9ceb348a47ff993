use super::{stream_layer, Output, Pass};
use crate::error::Result;
use crate::key::Key;
use crate::source::Source;
use log::info;
use std::io::{Read, Seek, Write};

/// Combine the entire source with one layer's key stream
///
/// Byte `i` of the result is `source[i] ^ key[i % key.len()]`. Because XOR
/// is self-inverse the same call both encrypts and decrypts, and layers may
/// be applied in any order. A failure mid-pass leaves the source partially
/// combined; nothing is rolled back.
pub fn combine_layer<F: Read + Write + Seek>(
    source: &mut Source<F>,
    key: &mut Key,
    output: Output,
) -> Result<u64> {
    match output {
        Output::InPlace => info!("Combining source {} with key {}", source.name(), key.name()),
        Output::Discard => info!(
            "Combining source {} with key {} (dry run)",
            source.name(),
            key.name()
        ),
    }
    stream_layer(source, key.stream_mut(), Pass::Combine(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::key::{resolve_key, ScriptedPrompt};
    use proptest::prelude::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn cfg(chunk_size: usize) -> RunConfig {
        RunConfig {
            chunk_size,
            ..Default::default()
        }
    }

    fn text_key(cfg: &RunConfig, text: &str) -> Key {
        resolve_key(cfg, text, 1, &mut ScriptedPrompt::default()).unwrap()
    }

    fn combine_bytes(data: &[u8], keys: &mut [Key], chunk_size: usize) -> Vec<u8> {
        let mut source = Source::new("mem", Cursor::new(data.to_vec()), chunk_size).unwrap();
        for key in keys.iter_mut() {
            combine_layer(&mut source, key, Output::InPlace).unwrap();
        }
        source.into_inner().unwrap().into_inner()
    }

    #[test]
    fn test_combine_twice_restores_source() {
        let cfg = cfg(32);
        let data: Vec<u8> = (0..500u32).map(|i| (i * 31 % 256) as u8).collect();
        let mut keys = vec![text_key(&cfg, "round-trip")];

        let encrypted = combine_bytes(&data, &mut keys, 32);
        assert_ne!(encrypted, data);
        assert_eq!(combine_bytes(&encrypted, &mut keys, 32), data);
    }

    #[test]
    fn test_file_key_wraps_cyclically() {
        let dir = tempdir().unwrap();
        let key_path = dir.path().join("short.key");
        let key_bytes = [0x01u8, 0x02, 0x04, 0x08, 0x10];
        std::fs::write(&key_path, key_bytes).unwrap();

        let cfg = cfg(8);
        let data: Vec<u8> = (0..37u8).collect();
        let mut key = resolve_key(
            &cfg,
            key_path.to_str().unwrap(),
            1,
            &mut ScriptedPrompt::default(),
        )
        .unwrap();

        let mut source = Source::new("mem", Cursor::new(data.clone()), 8).unwrap();
        assert_eq!(combine_layer(&mut source, &mut key, Output::InPlace).unwrap(), 37);
        let out = source.into_inner().unwrap().into_inner();

        let expected: Vec<u8> = data
            .iter()
            .enumerate()
            .map(|(i, b)| b ^ key_bytes[i % key_bytes.len()])
            .collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_discard_output_leaves_source() {
        let data = vec![0x55u8; 77];
        let mut key = text_key(&cfg(16), "discard");
        let mut source = Source::new("mem", Cursor::new(data.clone()), 16).unwrap();

        assert_eq!(combine_layer(&mut source, &mut key, Output::Discard).unwrap(), 77);
        assert!(source.is_done());
        assert_eq!(source.into_inner().unwrap().into_inner(), data);
    }

    #[test]
    fn test_layers_commute() {
        let cfg = cfg(24);
        let data: Vec<u8> = (0..300u32).map(|i| (i % 251) as u8).collect();

        let mut ab = vec![text_key(&cfg, "alpha"), text_key(&cfg, "bravo")];
        let mut ba = vec![text_key(&cfg, "bravo"), text_key(&cfg, "alpha")];

        assert_eq!(combine_bytes(&data, &mut ab, 24), combine_bytes(&data, &mut ba, 24));
    }

    proptest! {
        #[test]
        fn prop_combine_is_self_inverse(
            data in proptest::collection::vec(any::<u8>(), 0..600),
            secret in "[a-z]{1,20}",
            chunk in 1usize..64,
        ) {
            let cfg = cfg(chunk);
            let mut keys = vec![text_key(&cfg, &secret)];
            let once = combine_bytes(&data, &mut keys, chunk);
            let twice = combine_bytes(&once, &mut keys, chunk);
            prop_assert_eq!(twice, data);
        }

        #[test]
        fn prop_output_matches_cyclic_xor(
            data in proptest::collection::vec(any::<u8>(), 0..400),
            key_bytes in proptest::collection::vec(any::<u8>(), 1..50),
            chunk in 1usize..40,
        ) {
            let dir = tempdir().unwrap();
            let key_path = dir.path().join("k.bin");
            std::fs::write(&key_path, &key_bytes).unwrap();

            let cfg = cfg(chunk);
            let mut keys = vec![resolve_key(
                &cfg,
                key_path.to_str().unwrap(),
                1,
                &mut ScriptedPrompt::default(),
            )
            .unwrap()];
            let out = combine_bytes(&data, &mut keys, chunk);

            let expected: Vec<u8> = data
                .iter()
                .enumerate()
                .map(|(i, b)| b ^ key_bytes[i % key_bytes.len()])
                .collect();
            prop_assert_eq!(out, expected);
        }
    }
}
