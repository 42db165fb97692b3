pub fn run() -> anyhow::Result<()> {
    println!("hindsight {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
