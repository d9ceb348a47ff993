use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use vke::key::resolve_key;
use vke::{run, HashAlgorithm, KeyKind, LayerRegistry, RunConfig, ScriptedPrompt};

fn run_file(
    cfg: &RunConfig,
    source: &Path,
    specs: &[&str],
    prompt: &mut ScriptedPrompt,
) -> Result<vke::RunReport, Box<dyn Error>> {
    let mut layers = LayerRegistry::new();
    for (i, spec) in specs.iter().enumerate() {
        layers.append(spec, i + 1)?;
    }
    Ok(run(cfg, source, &mut layers, prompt)?)
}

fn small_chunks() -> RunConfig {
    RunConfig {
        chunk_size: 1000,
        ..Default::default()
    }
}

#[test]
fn layered_round_trip_with_mixed_keys() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let source = dir.path().join("doc.txt");
    let key_file = dir.path().join("k.bin");
    let original: Vec<u8> = (0..12_345u32).map(|i| (i ^ (i >> 3)) as u8).collect();
    fs::write(&source, &original)?;
    fs::write(&key_file, (0..333u32).map(|i| (i * 13) as u8).collect::<Vec<u8>>())?;
    let key = key_file.to_str().unwrap();

    let cfg = small_chunks();
    let mut prompt = ScriptedPrompt::new(["pass phrase", "pass phrase", "pass phrase", "pass phrase"]);

    let report = run_file(&cfg, &source, &[key, "literal text", "prompt"], &mut prompt)?;
    assert!(report.is_success());
    assert_eq!(report.combined_layers, 3);
    assert_ne!(fs::read(&source)?, original);

    let report = run_file(&cfg, &source, &["prompt", key, "literal text"], &mut prompt)?;
    assert!(report.is_success());
    assert_eq!(fs::read(&source)?, original);
    Ok(())
}

#[test]
fn permuted_chains_produce_identical_ciphertext() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let first = dir.path().join("first.bin");
    let second = dir.path().join("second.bin");
    let data = vec![0x42u8; 5_000];
    fs::write(&first, &data)?;
    fs::write(&second, &data)?;

    let cfg = small_chunks();
    let mut prompt = ScriptedPrompt::default();
    run_file(&cfg, &first, &["A-key", "B-key"], &mut prompt)?;
    run_file(&cfg, &second, &["B-key", "A-key"], &mut prompt)?;

    assert_eq!(fs::read(&first)?, fs::read(&second)?);
    Ok(())
}

#[test]
fn mismatched_passphrase_leaves_source_untouched() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let source = dir.path().join("doc.txt");
    let original = b"do not touch me".to_vec();
    fs::write(&source, &original)?;

    let mut prompt = ScriptedPrompt::new(["typed once", "typed twice"]);
    let report = run_file(&small_chunks(), &source, &["fine key", "prompt"], &mut prompt)?;

    assert_eq!(report.errors, 1);
    assert!(report.combine_skipped);
    assert_eq!(fs::read(&source)?, original);
    Ok(())
}

#[test]
fn dry_run_does_full_work_without_writing() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let source = dir.path().join("doc.txt");
    let original = vec![7u8; 4_321];
    fs::write(&source, &original)?;

    let cfg = RunConfig {
        dry_run: true,
        ..small_chunks()
    };
    let report = run_file(&cfg, &source, &["one", "two"], &mut ScriptedPrompt::default())?;

    assert!(report.is_success());
    assert_eq!(report.verified_layers, 2);
    assert_eq!(report.bytes_combined, 2 * 4_321);
    assert_eq!(fs::read(&source)?, original);
    assert_eq!(fs::metadata(&source)?.len(), 4_321);
    Ok(())
}

#[test]
fn long_text_keys_are_not_amplified() -> Result<(), Box<dyn Error>> {
    let long_text = "x".repeat(250);
    let cfg = RunConfig::default();
    let mut key = resolve_key(&cfg, &long_text, 1, &mut ScriptedPrompt::default())?;

    assert_eq!(key.kind(), KeyKind::Text);
    assert!(!key.is_amplified());
    assert_eq!(key.len(), 250);
    assert!(key.stream_mut().next_chunk(300)?.iter().all(|&b| b == b'x'));
    Ok(())
}

#[test]
fn hash_choice_must_match_to_decrypt() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let source = dir.path().join("doc.txt");
    let original = b"hash choice matters".to_vec();
    fs::write(&source, &original)?;

    let sha3 = small_chunks();
    let blake = RunConfig {
        hash: HashAlgorithm::Blake3,
        ..small_chunks()
    };
    let mut prompt = ScriptedPrompt::default();

    run_file(&sha3, &source, &["shared"], &mut prompt)?;
    run_file(&blake, &source, &["shared"], &mut prompt)?;
    assert_ne!(fs::read(&source)?, original);

    run_file(&blake, &source, &["shared"], &mut prompt)?;
    run_file(&sha3, &source, &["shared"], &mut prompt)?;
    assert_eq!(fs::read(&source)?, original);
    Ok(())
}
