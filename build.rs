fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/license_protocol.proto");
    #[cfg(feature = "regenerate-protocol")]
    regenerate()?;
    Ok(())
}

/// Rewrite the checked-in `src/wvlicense_license_protocol.rs` from the proto.
#[cfg(feature = "regenerate-protocol")]
fn regenerate() -> Result<(), Box<dyn std::error::Error>> {
    use std::path::PathBuf;

    let mut config = prost_build::Config::new();
    let out_dir = PathBuf::from("src");
    config.out_dir(&out_dir);
    config.compile_protos(&["src/license_protocol.proto"], &["src"])?;
    let generated_file = out_dir.join("wvlicense_license_protocol.rs");
    let contents = std::fs::read_to_string(&generated_file)?;
    std::fs::write(
        &generated_file,
        format!("#![cfg_attr(rustfmt, rustfmt_skip)]\n{}", contents),
    )?;
    Ok(())
}
