use std::path::PathBuf;

use rayfan::hero_params;

fn rayfan_exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_rayfan")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "rayfan.exe"
            } else {
                "rayfan"
            });
            p
        })
}

#[test]
fn cli_frame_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke_frame");
    std::fs::create_dir_all(&dir).unwrap();

    let config_path = dir.join("params.json");
    let out_path = dir.join("out.png");
    let _ = std::fs::remove_file(&out_path);

    let f = std::fs::File::create(&config_path).unwrap();
    serde_json::to_writer_pretty(f, &hero_params()).unwrap();

    let config_arg = config_path.to_string_lossy().to_string();
    let out_arg = out_path.to_string_lossy().to_string();

    let status = std::process::Command::new(rayfan_exe())
        .args([
            "frame",
            "--config",
            config_arg.as_str(),
            "--width",
            "64",
            "--height",
            "48",
            "--t",
            "0.5",
            "--out",
        ])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
}

#[test]
fn cli_sequence_writes_numbered_frames() {
    let dir = PathBuf::from("target").join("cli_smoke_seq");
    let _ = std::fs::remove_dir_all(&dir);

    let dir_arg = dir.to_string_lossy().to_string();
    let status = std::process::Command::new(rayfan_exe())
        .args([
            "sequence",
            "--width",
            "32",
            "--height",
            "32",
            "--fps",
            "8",
            "--duration",
            "0.5",
            "--out-dir",
        ])
        .arg(dir_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    // ceil(0.5 s * 8 fps) = 4 frames.
    assert!(dir.join("frame_0000.png").exists());
    assert!(dir.join("frame_0003.png").exists());
    assert!(!dir.join("frame_0004.png").exists());
}
