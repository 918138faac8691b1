use std::env;
use std::path::PathBuf;

/// Point Windows users at a usable FFmpeg before `ffmpeg-sys-next` fails
/// with a less helpful linker error.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows")
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        println!(
            "cargo:warning=slidegrab needs the FFmpeg libraries; set FFMPEG_DIR to an FFmpeg install (e.g. from vcpkg)."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);
    if candidate.join("include").join("libavcodec").exists() {
        println!(
            "cargo:warning=Found FFmpeg under {}; set FFMPEG_DIR to this path.",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=No FFmpeg headers under {}; run `vcpkg install ffmpeg` or set FFMPEG_DIR.",
            candidate.display()
        );
    }
}
