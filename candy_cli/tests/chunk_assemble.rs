use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn unique_dir(name: &str) -> PathBuf {
    let mut base = std::env::temp_dir();
    base.push(format!(
        "candy_cli_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&base).unwrap();
    base
}

fn run_cli(base: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_candy"))
        .args(args)
        .env("XDG_CONFIG_HOME", base)
        .output()
        .expect("failed to execute candy")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn chunk_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|n| n.ends_with(".chunk"))
        .collect();
    names.sort();
    names
}

#[test]
fn chunk_then_assemble_restores_files() -> anyhow::Result<()> {
    let base = unique_dir("roundtrip");
    let a = base.join("a.txt");
    let b = base.join("b.bin");
    fs::write(&a, b"hello from candy, this spans several chunks")?;
    fs::write(&b, [0u8; 0])?;
    let chunks = base.join("chunks");
    let restored = base.join("restored");

    let out = stdout(&run_cli(
        &base,
        &[
            "--max-chunk-size",
            "16",
            "chunk",
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "--out",
            chunks.to_str().unwrap(),
        ],
    ));
    assert!(out.contains("zone 0"));
    assert!(out.contains("zone 1"));

    let names = chunk_files(&chunks);
    assert!(names.contains(&"z0-c0.chunk".to_string()));
    assert!(names.contains(&"z0-c2.chunk".to_string()));
    assert!(names.contains(&"z1-c0.chunk".to_string()));
    for name in &names {
        assert!(fs::metadata(chunks.join(name))?.len() <= 16);
    }

    let out = stdout(&run_cli(
        &base,
        &[
            "assemble",
            chunks.to_str().unwrap(),
            "--out",
            restored.to_str().unwrap(),
        ],
    ));
    assert_eq!(out.lines().count(), 2);
    assert_eq!(fs::read(restored.join("z0.bin"))?, fs::read(&a)?);
    assert!(fs::read(restored.join("z1.bin"))?.is_empty());

    let json = stdout(&run_cli(&base, &["assemble", chunks.to_str().unwrap(), "--json"]));
    assert!(json.lines().all(|l| l.starts_with('"')));

    fs::remove_dir_all(&base)?;
    Ok(())
}

#[test]
fn assemble_reports_missing_chunk() -> anyhow::Result<()> {
    let base = unique_dir("gap");
    let input = base.join("input");
    fs::write(&input, vec![7u8; 100])?;
    let chunks = base.join("chunks");

    stdout(&run_cli(
        &base,
        &[
            "--max-chunk-size",
            "10",
            "chunk",
            input.to_str().unwrap(),
            "--out",
            chunks.to_str().unwrap(),
        ],
    ));
    fs::remove_file(chunks.join("z0-c3.chunk"))?;

    let output = run_cli(&base, &["assemble", chunks.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("chunk 3 is missing"), "stderr: {stderr}");

    fs::remove_dir_all(&base)?;
    Ok(())
}

#[test]
fn page_walks_a_zone() -> anyhow::Result<()> {
    let base = unique_dir("page");
    let input = base.join("input");
    // 26 payload bytes encode to a 31 byte zone
    fs::write(&input, b"abcdefghijklmnopqrstuvwxyz")?;
    let chunks = base.join("chunks");

    stdout(&run_cli(
        &base,
        &[
            "--max-chunk-size",
            "0",
            "chunk",
            input.to_str().unwrap(),
            "--out",
            chunks.to_str().unwrap(),
        ],
    ));
    assert_eq!(chunk_files(&chunks), vec!["z0-c0.chunk".to_string()]);

    let dir = chunks.to_str().unwrap();
    let first = stdout(&run_cli(
        &base,
        &["--max-chunk-size", "8", "page", dir, "--zone", "0", "--chunk", "0"],
    ));
    assert!(first.contains("outcome: more"));
    assert!(first.contains("chunk: 0:0 (8 bytes)"));
    assert!(first.contains("next: 0:1"));

    let last = stdout(&run_cli(
        &base,
        &["--max-chunk-size", "8", "page", dir, "--chunk", "3"],
    ));
    assert!(last.contains("outcome: complete"));
    assert!(last.contains("chunk: 0:3 (7 bytes)"));
    assert!(last.contains("next: end"));

    let beyond = run_cli(&base, &["--max-chunk-size", "8", "page", dir, "--chunk", "4"]);
    assert!(!beyond.status.success());

    let inspected = stdout(&run_cli(&base, &["inspect", &format!("{dir}/z0-c0.chunk")]));
    assert!(inspected.contains("variant: Bytes"));
    assert!(inspected.contains("encoded: 31 bytes"));

    fs::remove_dir_all(&base)?;
    Ok(())
}

#[test]
fn config_init_sets_budget() -> anyhow::Result<()> {
    let base = unique_dir("config");
    let config = base.join("candy.toml");
    let config_arg = config.to_str().unwrap();

    stdout(&run_cli(
        &base,
        &["--config", config_arg, "--max-chunk-size", "5", "config", "init"],
    ));
    let written = fs::read_to_string(&config)?;
    assert!(written.contains("[chunking]"));
    assert!(written.contains("max_chunk_size = 5"));

    // init without an override keeps the configured budget
    stdout(&run_cli(&base, &["--config", config_arg, "config", "init"]));
    assert!(fs::read_to_string(&config)?.contains("max_chunk_size = 5"));
    // written through a temporary file that is renamed into place
    assert!(!config.with_extension("tmp").exists());

    let input = base.join("input");
    fs::write(&input, b"0123456789")?;
    let chunks = base.join("chunks");
    stdout(&run_cli(
        &base,
        &[
            "--config",
            config_arg,
            "chunk",
            input.to_str().unwrap(),
            "--out",
            chunks.to_str().unwrap(),
        ],
    ));
    // 10 payload bytes encode to a 14 byte zone
    assert_eq!(chunk_files(&chunks).len(), 3);

    fs::remove_dir_all(&base)?;
    Ok(())
}
